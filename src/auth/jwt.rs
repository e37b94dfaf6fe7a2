use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Tokens are issued by the login service; this side only verifies them.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenType;

    #[test]
    fn verifies_tokens_signed_with_the_same_secret() {
        let token = testing::sign(7, 3, TokenType::Access, "secret");
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, 3);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn rejects_foreign_signatures() {
        let token = testing::sign(7, 3, TokenType::Access, "secret");
        assert!(verify_token(&token, "other").is_err());
        assert!(verify_token("not-a-token", "secret").is_err());
    }
}
