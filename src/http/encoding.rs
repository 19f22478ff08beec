use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;

use crate::config::{MAX_COMPRESSION_LEVEL, config};
use crate::error::CompressionError;
use crate::http::response::HttpResponse;
use crate::route::context::RequestContext;

const CONTENT_ENCODING: &str = "Content-Encoding";
const ACCEPT_ENCODING: &str = "Accept-Encoding";

// Content codings this crate can produce, as listed in MDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Gzip,
    Deflate,
    Identity,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Deflate => "deflate",
            CompressionAlgorithm::Identity => "identity",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "gzip" | "x-gzip" => Some(CompressionAlgorithm::Gzip),
            "deflate" => Some(CompressionAlgorithm::Deflate),
            "identity" => Some(CompressionAlgorithm::Identity),
            _ => None,
        }
    }
}

/// Picks the first coding of an `Accept-Encoding` value that can be produced.
///
/// Preference weights are not ranked, only `q=0` exclusions are honored.
/// Falls back to [`CompressionAlgorithm::Identity`].
pub fn negotiate(accept_encoding: &str) -> CompressionAlgorithm {
    accept_encoding
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';').map(str::trim);
            let token = parts.next()?;
            let refused = parts.any(|p| {
                p.split_once('=')
                    .filter(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                    .and_then(|(_, q)| q.trim().parse::<f32>().ok())
                    .is_some_and(|q| q == 0.0)
            });
            if refused {
                return None;
            }
            CompressionAlgorithm::from_token(token)
        })
        .next()
        .unwrap_or(CompressionAlgorithm::Identity)
}

/// Replaces the body of `res` with its compressed form and sets `Content-Encoding`.
///
/// `Identity` leaves the response untouched. `Content-Length` needs no update,
/// serialization derives it from the new body. Levels above 9 are clamped.
pub fn compress(
    res: &mut HttpResponse,
    algo: CompressionAlgorithm,
    level: u32,
) -> Result<(), CompressionError> {
    let level = Compression::new(level.min(MAX_COMPRESSION_LEVEL));
    let body = match algo {
        CompressionAlgorithm::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), level);
            e.write_all(res.content())?;
            e.finish()?
        }
        CompressionAlgorithm::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), level);
            e.write_all(res.content())?;
            e.finish()?
        }
        CompressionAlgorithm::Identity => return Ok(()),
    };

    tracing::debug!(
        encoding = algo.as_str(),
        before = res.content().len(),
        after = body.len(),
        "compressed response body"
    );

    res.set_content(body);
    res.set_header(CONTENT_ENCODING, algo.as_str());
    Ok(())
}

/// Compresses the context's response according to the request's `Accept-Encoding`.
///
/// Empty bodies and responses that already carry a `Content-Encoding` are left
/// alone. A compression failure is logged and the body stays uncompressed.
pub fn apply<T: ?Sized>(ctx: &mut RequestContext<'_, T>) {
    let Some(accept) = ctx.request().header(ACCEPT_ENCODING) else {
        return;
    };

    let res = ctx.response();
    let encoded = res
        .headers()
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_ENCODING));
    if res.content().is_empty() || encoded {
        return;
    }

    let algo = negotiate(accept);
    if let Err(err) = compress(ctx.response_mut(), algo, config().compression_level()) {
        tracing::warn!(encoding = algo.as_str(), "{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::http::HttpMethod;
    use crate::http::request::HttpRequest;
    use flate2::read::{DeflateDecoder, GzDecoder};
    use pretty_assertions::assert_eq;
    use std::io::Read;

    const BODY: &str = "<h1>Welcome!</h1><h1>Welcome!</h1><h1>Welcome!</h1>";

    fn response_with_body() -> HttpResponse {
        let mut res = HttpResponse::with_config(&HttpConfig::default());
        res.set_content(BODY);
        res
    }

    #[test]
    fn negotiate_takes_first_supported() {
        assert_eq!(negotiate("br, gzip, deflate"), CompressionAlgorithm::Gzip);
        assert_eq!(negotiate("deflate;q=0.5, gzip"), CompressionAlgorithm::Deflate);
        assert_eq!(negotiate("GZIP"), CompressionAlgorithm::Gzip);
    }

    #[test]
    fn negotiate_skips_refused_and_unknown() {
        assert_eq!(negotiate("gzip;q=0, deflate"), CompressionAlgorithm::Deflate);
        assert_eq!(negotiate("gzip;Q=0, deflate"), CompressionAlgorithm::Deflate);
        assert_eq!(negotiate("gzip; q = 0, deflate"), CompressionAlgorithm::Deflate);
        assert_eq!(negotiate("br, zstd"), CompressionAlgorithm::Identity);
        assert_eq!(negotiate(""), CompressionAlgorithm::Identity);
    }

    #[test]
    fn gzip_round_trips() {
        let mut res = response_with_body();
        compress(&mut res, CompressionAlgorithm::Gzip, 6).unwrap();

        assert_eq!(res.headers().get("Content-Encoding"), Some("gzip"));
        let mut decoded = String::new();
        GzDecoder::new(res.content())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, BODY);
    }

    #[test]
    fn deflate_round_trips() {
        let mut res = response_with_body();
        compress(&mut res, CompressionAlgorithm::Deflate, 9).unwrap();

        assert_eq!(res.headers().get("Content-Encoding"), Some("deflate"));
        let mut decoded = String::new();
        DeflateDecoder::new(res.content())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, BODY);
    }

    #[test]
    fn out_of_range_level_is_clamped() {
        let mut res = response_with_body();
        compress(&mut res, CompressionAlgorithm::Gzip, 42).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(res.content())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, BODY);
    }

    #[test]
    fn identity_is_a_no_op() {
        let mut res = response_with_body();
        compress(&mut res, CompressionAlgorithm::Identity, 6).unwrap();
        assert_eq!(res, response_with_body());
    }

    #[test]
    fn apply_follows_accept_encoding() {
        let req = HttpRequest::new(HttpMethod::Get, "/").with_header("Accept-Encoding", "gzip");
        let mut ctx = RequestContext::new(&(), &req);
        ctx.response_mut().set_content(BODY);

        apply(&mut ctx);

        assert_eq!(ctx.response().headers().get("Content-Encoding"), Some("gzip"));
        assert_ne!(ctx.response().content(), BODY.as_bytes());
    }

    #[test]
    fn apply_without_accept_encoding_leaves_body() {
        let req = HttpRequest::new(HttpMethod::Get, "/");
        let mut ctx = RequestContext::new(&(), &req);
        ctx.response_mut().set_content(BODY);

        apply(&mut ctx);

        assert!(!ctx.response().headers().contains("Content-Encoding"));
        assert_eq!(ctx.response().content(), BODY.as_bytes());
    }

    #[test]
    fn apply_does_not_encode_twice() {
        let req = HttpRequest::new(HttpMethod::Get, "/").with_header("Accept-Encoding", "gzip");
        let mut ctx = RequestContext::new(&(), &req);
        ctx.response_mut()
            .set_content(BODY)
            .set_header("Content-Encoding", "br");

        apply(&mut ctx);

        assert_eq!(ctx.response().headers().get("Content-Encoding"), Some("br"));
        assert_eq!(ctx.response().content(), BODY.as_bytes());
    }

    #[test]
    fn apply_sees_lowercase_content_encoding() {
        let req = HttpRequest::new(HttpMethod::Get, "/").with_header("Accept-Encoding", "gzip");
        let mut ctx = RequestContext::new(&(), &req);
        ctx.response_mut()
            .set_content(BODY)
            .set_header("content-encoding", "br");

        apply(&mut ctx);

        let res = ctx.response();
        assert!(!res.headers().contains("Content-Encoding"));
        assert_eq!(res.headers().get("content-encoding"), Some("br"));
        assert_eq!(res.content(), BODY.as_bytes());
    }
}
