//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Overload alert classification."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---

/// Overload when the weight is strictly above the threshold.
pub fn classify(weight_t: f64, threshold_t: f64) -> bool {
    weight_t > threshold_t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_not_an_overload() {
        assert!(!classify(10.0, 10.0));
        assert!(classify(10.001, 10.0));
        assert!(!classify(9.999, 10.0));
    }

    #[test]
    fn zero_weight_never_alerts() {
        assert!(!classify(0.0, 0.1));
    }
}
