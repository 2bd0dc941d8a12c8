//! The circuit-native hash: Poseidon over the BN254 scalar field with the circom parameters.
//!
//! Outputs are bit-identical to circomlib's `Poseidon(n)` template for `1 <= n <= 12` inputs, so
//! any value hashed here can be recomputed inside the proving circuit.

use crate::common::*;
use light_poseidon::{Poseidon, PoseidonHasher};

/// Largest arity supported by the circom parameter set.
pub const MAX_INPUTS: usize = 12;

/// Hash a non-empty list of field elements.
///
/// Fails with [`Error::CircuitHash`] if `inputs` is empty or longer than [`MAX_INPUTS`].
pub fn hash(inputs: &[FieldElement]) -> Result<FieldElement, Error> {
    if inputs.is_empty() || inputs.len() > MAX_INPUTS {
        return Err(Error::CircuitHash(format!(
            "arity {} is outside 1..={}",
            inputs.len(),
            MAX_INPUTS
        )));
    }
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).map_err(|e| Error::CircuitHash(e.to_string()))?;
    let fields: Vec<Fr> = inputs.iter().map(|x| x.to_field()).collect();
    hasher
        .hash(&fields)
        .map(FieldElement::from_field)
        .map_err(|e| Error::CircuitHash(e.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn fe(s: &str) -> FieldElement {
        s.parse().unwrap()
    }

    #[test]
    fn matches_circomlib_vectors() {
        assert_eq!(
            hash(&[FieldElement::from(1)]).unwrap(),
            fe("18586133768512220936620570745912940619677854269274689475585506675881198879027")
        );
        assert_eq!(
            hash(&[FieldElement::from(1), FieldElement::from(2)]).unwrap(),
            fe("7853200120776062878684798364095072458815029376092732009249414926327459813530")
        );
        assert_eq!(
            hash(&[FieldElement::from(1), FieldElement::from(1)]).unwrap(),
            fe("217234377348884654691879377518794323857294947151490278790710809376325639809")
        );
    }

    #[test]
    fn input_order_matters() {
        let a = FieldElement::from(1);
        let b = FieldElement::from(2);
        assert_ne!(hash(&[a, b]).unwrap(), hash(&[b, a]).unwrap());
    }

    #[test]
    fn rejects_bad_arity() {
        assert!(matches!(hash(&[]), Err(Error::CircuitHash(_))));
        let too_many = vec![FieldElement::from(1); MAX_INPUTS + 1];
        assert!(matches!(hash(&too_many), Err(Error::CircuitHash(_))));
        let max = vec![FieldElement::from(1); MAX_INPUTS];
        assert!(hash(&max).is_ok());
    }
}
