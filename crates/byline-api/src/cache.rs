//! Response cache-control policy.
//!
//! A pure `directive(method, path)` function applied as middleware on the
//! way out. A `Cache-Control` header a handler already set is never
//! overridden. Action sub-paths (`like`/`view`/`liked`) are carved out of
//! the post-detail rule; they fall to the default directive. Both trailing
//! slash forms of every path are tolerated.

use axum::{
  extract::Request,
  http::{HeaderValue, Method, header},
  middleware::Next,
  response::Response,
};

/// Cache-control directive for a request. Directive strings are fixed per
/// resource class.
pub fn directive(method: &Method, path: &str) -> &'static str {
  if method != Method::GET && method != Method::HEAD {
    return "no-store, no-cache, must-revalidate, max-age=0";
  }

  let path = path.trim_matches('/');
  if path.starts_with("static/") {
    return "public, max-age=604800"; // 1 week
  }

  let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
  match segments.split_first() {
    Some((&"posts", rest)) => {
      if rest.is_empty() {
        "public, max-age=300" // collection listing, 5 minutes
      } else if matches!(*segments.last().unwrap(), "like" | "view" | "liked") {
        "public, max-age=600"
      } else {
        "public, max-age=3600" // post detail, 1 hour
      }
    }
    Some((&"profiles", _)) | Some((&"users", _)) => "private, max-age=60",
    _ => "public, max-age=600", // default, 10 minutes
  }
}

/// Annotate the outgoing response, unless the handler already did.
pub async fn apply(req: Request, next: Next) -> Response {
  let method = req.method().clone();
  let path = req.uri().path().to_string();

  let mut response = next.run(req).await;
  if !response.headers().contains_key(header::CACHE_CONTROL) {
    response.headers_mut().insert(
      header::CACHE_CONTROL,
      HeaderValue::from_static(directive(&method, &path)),
    );
  }
  response
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mutating_methods_are_never_cached() {
    for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
      assert_eq!(
        directive(&method, "/posts"),
        "no-store, no-cache, must-revalidate, max-age=0"
      );
    }
  }

  #[test]
  fn collection_and_detail_tiers() {
    assert_eq!(directive(&Method::GET, "/posts"), "public, max-age=300");
    assert_eq!(directive(&Method::GET, "/posts/"), "public, max-age=300");
    assert_eq!(
      directive(&Method::GET, "/posts/64f0c2a7e13d4b5a9c8d7e6f"),
      "public, max-age=3600"
    );
  }

  #[test]
  fn action_sub_paths_fall_to_the_default() {
    assert_eq!(
      directive(&Method::GET, "/posts/64f0c2a7e13d4b5a9c8d7e6f/like/"),
      "public, max-age=600"
    );
    assert_eq!(
      directive(&Method::GET, "/posts/64f0c2a7e13d4b5a9c8d7e6f/view"),
      "public, max-age=600"
    );
    assert_eq!(directive(&Method::GET, "/posts/liked"), "public, max-age=600");
  }

  #[test]
  fn user_specific_paths_are_private() {
    assert_eq!(directive(&Method::GET, "/profiles/me"), "private, max-age=60");
    assert_eq!(directive(&Method::GET, "/users/abc"), "private, max-age=60");
  }

  #[test]
  fn static_assets_cache_long() {
    assert_eq!(
      directive(&Method::GET, "/static/app.css"),
      "public, max-age=604800"
    );
  }

  #[test]
  fn everything_else_gets_the_default() {
    assert_eq!(directive(&Method::GET, "/"), "public, max-age=600");
    assert_eq!(directive(&Method::GET, "/media/x.png"), "public, max-age=600");
  }
}
