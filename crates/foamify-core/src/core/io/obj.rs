use crate::core::mesh::Mesh;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Wavefront OBJ output for triangle meshes.
///
/// Writes one `v` line per vertex followed by one `f` line per triangle. OBJ indices are
/// 1-based, so every mesh index is shifted by one on output.
pub struct ObjFile;

impl ObjFile {
    pub fn write_to(mesh: &Mesh, object_name: &str, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "# foamify strut mesh")?;
        writeln!(
            writer,
            "# {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        )?;
        writeln!(writer, "o {}", object_name)?;
        for v in &mesh.vertices {
            writeln!(writer, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)?;
        }
        for [a, b, c] in &mesh.triangles {
            writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        mesh: &Mesh,
        object_name: &str,
        path: P,
    ) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(mesh, object_name, &mut writer)?;
        writer.flush()
    }
}
