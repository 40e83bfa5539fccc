//! Link verifier that confirms sessions at a configured success rate.

use crate::signature::sign;
use async_trait::async_trait;
use qcomm_core::error::Result;
use qcomm_core::random::SimRng;
use qcomm_core::session::{LinkVerification, LinkVerifier};
use rand::Rng;
use tokio::sync::Mutex;

pub struct SignatureLinkVerifier {
    success_rate: f64,
    rng: Mutex<SimRng>,
}

impl SignatureLinkVerifier {
    pub fn new(success_rate: f64, rng: SimRng) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl LinkVerifier for SignatureLinkVerifier {
    async fn verify_link(&self, session_id: &str) -> Result<LinkVerification> {
        let verified = {
            let mut rng = self.rng.lock().await;
            rng.gen_bool(self.success_rate)
        };
        let checked_at = chrono::Utc::now().to_rfc3339();
        let signature = sign(&[session_id, &checked_at, if verified { "ok" } else { "void" }]);

        Ok(LinkVerification {
            verified,
            signature,
            checked_at,
        })
    }
}
