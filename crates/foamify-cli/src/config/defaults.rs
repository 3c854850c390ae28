/// Values used when neither the config file nor the command line sets a parameter.
pub struct DefaultsConfig {
    pub cells_per_axis: usize,
    pub periodic: bool,
    pub strut_radius: f64,
    pub contact_scale: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            cells_per_axis: 10,
            periodic: false,
            strut_radius: 0.1,
            contact_scale: 1.0,
        }
    }
}
