use p256::ecdsa::signature::{Signer, Verifier};
use thiserror::Error;

use crate::keypair::EcKeyPair;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signature encoding")]
    InvalidEncoding,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("unrecognised public key")]
    InvalidPublicKey,
}

/// Sign `message_digest` (already `SHA-256(tx_without_signature)` per the
/// caller) with whichever curve `keypair` holds. The signature is the
/// fixed-width big-endian `r || s` concatenation each curve's `Signature`
/// type already produces.
pub fn sign(keypair: &EcKeyPair, message_digest: &[u8; 32]) -> Vec<u8> {
    match keypair {
        EcKeyPair::P256(k) => {
            let sig: p256::ecdsa::Signature = k.sign(message_digest);
            sig.to_bytes().to_vec()
        }
        EcKeyPair::P384(k) => {
            let sig: p384::ecdsa::Signature = k.sign(message_digest);
            sig.to_bytes().to_vec()
        }
        EcKeyPair::P521(k) => {
            let sig: p521::ecdsa::Signature = k.sign(message_digest);
            sig.to_bytes().to_vec()
        }
    }
}

/// Verify `signature` (`r || s`) against `message_digest` using the SPKI DER
/// public key bytes, trying each curve in turn (the public key's DER header
/// identifies the curve; this additionally serves as a structural check).
pub fn verify(
    public_key_der: &[u8],
    message_digest: &[u8; 32],
    signature: &[u8],
) -> Result<(), SignatureError> {
    use p256::pkcs8::DecodePublicKey;

    if let Ok(vk) = p256::ecdsa::VerifyingKey::from_public_key_der(public_key_der) {
        let sig = p256::ecdsa::Signature::from_slice(signature)
            .map_err(|_| SignatureError::InvalidEncoding)?;
        return vk
            .verify(message_digest, &sig)
            .map_err(|_| SignatureError::VerificationFailed);
    }
    if let Ok(vk) = p384::ecdsa::VerifyingKey::from_public_key_der(public_key_der) {
        let sig = p384::ecdsa::Signature::from_slice(signature)
            .map_err(|_| SignatureError::InvalidEncoding)?;
        return vk
            .verify(message_digest, &sig)
            .map_err(|_| SignatureError::VerificationFailed);
    }
    if let Ok(vk) = p521::ecdsa::VerifyingKey::from_public_key_der(public_key_der) {
        let sig = p521::ecdsa::Signature::from_slice(signature)
            .map_err(|_| SignatureError::InvalidEncoding)?;
        return vk
            .verify(message_digest, &sig)
            .map_err(|_| SignatureError::VerificationFailed);
    }
    Err(SignatureError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let kp = EcKeyPair::generate().unwrap();
        let der = kp.public_key_der().unwrap();
        let digest = [7u8; 32];
        let sig = sign(&kp, &digest);
        assert!(verify(&der, &digest, &sig).is_ok());
    }

    #[test]
    fn tampered_digest_fails() {
        let kp = EcKeyPair::generate().unwrap();
        let der = kp.public_key_der().unwrap();
        let digest = [7u8; 32];
        let sig = sign(&kp, &digest);
        let other = [8u8; 32];
        assert!(verify(&der, &other, &sig).is_err());
    }
}
