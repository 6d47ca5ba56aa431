/// Google Custom Search credentials, resolved from the environment once at
/// startup and passed down explicitly. The site's Next.js tooling historically
/// exposed these under `NEXT_PUBLIC_`-prefixed names, so both spellings work.
#[derive(Debug, Clone)]
pub struct GoogleCseCredentials {
    pub api_key: String,
    pub engine_id: String,
}

impl GoogleCseCredentials {
    /// Returns `None` when either half of the credential pair is missing;
    /// the image-search resolver is then skipped without any network calls.
    pub fn from_env() -> Option<Self> {
        let api_key = env_first(&["GOOGLE_CSE_API_KEY", "NEXT_PUBLIC_GOOGLE_CSE_API_KEY"])?;
        let engine_id = env_first(&["GOOGLE_CSE_ID", "NEXT_PUBLIC_GOOGLE_CSE_ID"])?;
        Some(Self { api_key, engine_id })
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    for name in names {
        if let Ok(value) = std::env::var(name)
            && !value.trim().is_empty()
        {
            return Some(value);
        }
    }
    None
}
