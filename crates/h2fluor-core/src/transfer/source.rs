//! The attenuated incident continuum.

use crate::transfer::check_len;
use crate::types::PhysicsError;

/// source(λ) = incident(λ) · exp(−τ_tot(λ)).
pub fn attenuate(incident: &[f64], tau_total: &[f64]) -> Result<Vec<f64>, PhysicsError> {
    check_len("source function", incident.len(), tau_total.len())?;
    if let Some((index, &value)) = incident.iter().enumerate().find(|(_, i)| !(**i >= 0.0)) {
        return Err(PhysicsError::NegativeValue {
            quantity: "incident intensity",
            index,
            value,
        });
    }
    Ok(incident
        .iter()
        .zip(tau_total)
        .map(|(&i, &t)| i * (-t).exp())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounded_by_incident() {
        let incident = [1e5, 2e5, 0.0, 7.5e4];
        let tau = [0.0, 0.3, 12.0, 800.0];
        let source = attenuate(&incident, &tau).unwrap();
        assert_eq!(source[0], incident[0]);
        assert_relative_eq!(source[1], 2e5 * (-0.3_f64).exp(), max_relative = 1e-15);
        for (s, i) in source.iter().zip(&incident) {
            assert!(*s >= 0.0 && s <= i);
        }
        assert_eq!(source[3], 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(attenuate(&[1.0, 2.0], &[0.0]).is_err());
        assert!(attenuate(&[-1.0], &[0.0]).is_err());
    }
}
