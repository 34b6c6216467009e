/// Identity of the caller for one request. Threaded into every mutating
/// engine call and stamped into `updated_by`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub actor: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, actor: Option<&str>) -> Self {
        let actor = actor
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("system");
        Self {
            request_id: request_id.into(),
            actor: actor.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_actor_falls_back_to_system() {
        assert_eq!(RequestContext::new("1", None).actor, "system");
        assert_eq!(RequestContext::new("1", Some("  ")).actor, "system");
        assert_eq!(RequestContext::new("1", Some("registrar")).actor, "registrar");
    }
}
