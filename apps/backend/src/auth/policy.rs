//! Declarative route authorization: an ordered list of
//! `(method, path pattern) -> access` rules, first match wins.
//!
//! Patterns are segment globs: `*` matches exactly one segment, a trailing
//! `**` matches zero or more. More specific rules must precede catch-alls.

use actix_web::http::Method;

use crate::entities::users::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity resolution is attempted at all.
    Public,
    /// Any resolved identity passes.
    Authenticated,
    /// Identity must hold one of the listed roles.
    Roles(&'static [Role]),
}

#[derive(Debug, Clone)]
struct AccessRule {
    /// `None` matches every method.
    method: Option<Method>,
    pattern: &'static str,
    access: Access,
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

const EDITOR_ROLES: &[Role] = &[Role::Admin, Role::Manager];

impl AccessPolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule(mut self, method: Option<Method>, pattern: &'static str, access: Access) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern,
            access,
        });
        self
    }

    /// The blog's route table: reading is public, writing posts needs an
    /// editor role, and the `/api/secure` surface needs any authenticated
    /// user.
    pub fn blog_defaults() -> Self {
        Self::new()
            .rule(Some(Method::GET), "/api/posts/**", Access::Public)
            // Likes are anonymous (device-keyed), so they are carved out
            // before the editor-only POST rule below.
            .rule(Some(Method::POST), "/api/posts/*/like", Access::Public)
            .rule(Some(Method::POST), "/api/posts/**", Access::Roles(EDITOR_ROLES))
            .rule(Some(Method::PUT), "/api/posts/**", Access::Roles(EDITOR_ROLES))
            .rule(
                Some(Method::DELETE),
                "/api/posts/**",
                Access::Roles(EDITOR_ROLES),
            )
            .rule(Some(Method::GET), "/api/verify-auth", Access::Authenticated)
            .rule(None, "/api/secure/**", Access::Authenticated)
            .rule(None, "/**", Access::Public)
    }

    /// First matching rule decides; an unmatched path is public.
    pub fn access_for(&self, method: &Method, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().map_or(true, |m| m == method)
                    && pattern_matches(rule.pattern, path)
            })
            .map(|rule| rule.access)
            .unwrap_or(Access::Public)
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.access_for(method, path) == Access::Public
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::blog_defaults()
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segs = pattern.trim_matches('/').split('/');
    let mut path_segs = path.trim_matches('/').split('/').peekable();

    for pseg in pattern_segs.by_ref() {
        if pseg == "**" {
            // Matches the whole remainder, including nothing.
            return true;
        }
        match path_segs.next() {
            Some(seg) if pseg == "*" || pseg == seg => {}
            _ => return false,
        }
    }

    path_segs.peek().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_segments() {
        assert!(pattern_matches("/api/posts/**", "/api/posts"));
        assert!(pattern_matches("/api/posts/**", "/api/posts/5"));
        assert!(pattern_matches("/api/posts/**", "/api/posts/5/like"));
        assert!(!pattern_matches("/api/posts/**", "/api/comments"));

        assert!(pattern_matches("/api/*/like", "/api/posts/like"));
        assert!(!pattern_matches("/api/*/like", "/api/posts/5/like"));

        assert!(pattern_matches("/api/verify-auth", "/api/verify-auth"));
        assert!(!pattern_matches("/api/verify-auth", "/api/verify-auth/x"));
    }

    #[test]
    fn reading_posts_is_public_writing_needs_editor() {
        let policy = AccessPolicy::blog_defaults();

        assert_eq!(
            policy.access_for(&Method::GET, "/api/posts/5"),
            Access::Public
        );
        assert_eq!(
            policy.access_for(&Method::POST, "/api/posts/create"),
            Access::Roles(EDITOR_ROLES)
        );
        assert_eq!(
            policy.access_for(&Method::DELETE, "/api/posts/5"),
            Access::Roles(EDITOR_ROLES)
        );
    }

    #[test]
    fn first_match_wins_over_catch_all() {
        let policy = AccessPolicy::blog_defaults();

        assert_eq!(
            policy.access_for(&Method::PUT, "/api/secure/password"),
            Access::Authenticated
        );
        // Catch-all applies to everything the earlier rules skipped.
        assert_eq!(
            policy.access_for(&Method::POST, "/api/comments"),
            Access::Public
        );
        assert_eq!(policy.access_for(&Method::GET, "/health"), Access::Public);
    }

    #[test]
    fn anonymous_like_routes_stay_public() {
        let policy = AccessPolicy::blog_defaults();
        assert_eq!(
            policy.access_for(&Method::POST, "/api/posts/5/like"),
            Access::Public
        );
        assert_eq!(
            policy.access_for(&Method::GET, "/api/posts/5/like"),
            Access::Public
        );
    }

    #[test]
    fn unmatched_path_is_public() {
        let policy = AccessPolicy::new();
        assert_eq!(policy.access_for(&Method::GET, "/anything"), Access::Public);
    }
}
