// [libs/domain/auth-service/src/password.rs]
use crate::errors::AuthError;

const BCRYPT_COST: u32 = 12;

/// Hash bcrypt fijo y válido de una contraseña que nunca se usará
/// realmente, verificado cuando la cuenta no existe para que el tiempo de
/// respuesta del login no revele si el correo está registrado.
const DUMMY_HASH: &str = "$2b$12$C6UzMDM.H6dfI/f/IKcEeO/k8zqQzPQgLI6YSqKO1qFGMIl0v/pqy";

pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plaintext, BCRYPT_COST)?)
}

/// Siempre ejecuta una verificación bcrypt, incluso cuando `stored_hash`
/// es `None`, usando `DUMMY_HASH` como sustituto — el costo de CPU de la
/// verificación es el mismo en ambas ramas.
pub fn verify_password(plaintext: &str, stored_hash: Option<&str>) -> Result<bool, AuthError> {
    let hash_to_check = stored_hash.unwrap_or(DUMMY_HASH);
    let matches = bcrypt::verify(plaintext, hash_to_check)?;
    Ok(matches && stored_hash.is_some())
}

/// Política mínima de fuerza de contraseña: al menos 12 caracteres, con
/// mayúscula, minúscula, dígito y símbolo.
pub fn meets_strength_policy(plaintext: &str) -> bool {
    if plaintext.chars().count() < 12 {
        return false;
    }
    let has_upper = plaintext.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = plaintext.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = plaintext.chars().any(|c| c.is_ascii_digit());
    let has_special = plaintext.chars().any(|c| !c.is_ascii_alphanumeric());
    has_upper && has_lower && has_digit && has_special
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_policy_rejects_short_or_simple_passwords() {
        assert!(!meets_strength_policy("short1!"));
        assert!(!meets_strength_policy("alllowercase123!"));
        assert!(!meets_strength_policy("ALLUPPERCASE123!"));
        assert!(!meets_strength_policy("NoDigitsHere!!"));
        assert!(!meets_strength_policy("NoSpecialChars123"));
        assert!(meets_strength_policy("Valid-Pass123!"));
    }

    #[test]
    fn verify_password_rejects_when_no_stored_hash_but_still_runs_bcrypt() {
        let result = verify_password("whatever", None).unwrap();
        assert!(!result);
    }

    #[test]
    fn round_trip_hash_and_verify() {
        let hash = hash_password("Correct-Horse99!").unwrap();
        assert!(verify_password("Correct-Horse99!", Some(&hash)).unwrap());
        assert!(!verify_password("wrong-password", Some(&hash)).unwrap());
    }
}
