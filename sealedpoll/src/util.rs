use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng {};
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, public)
}

/// Rebuild a keypair from its secret half
pub fn keypair_from_secret(secret: &SecretKey) -> Keypair {
    let public: PublicKey = secret.into();
    // SecretKey is not Clone; round-trip through bytes
    let secret = SecretKey::from_bytes(secret.as_bytes()).expect("32-byte secret key");
    Keypair { secret, public }
}
