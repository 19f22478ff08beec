use pretty_assertions::assert_eq;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, UNIX_EPOCH};

use routenet::http::HttpMethod;
use routenet::http::encoding;
use routenet::http::request::HttpRequest;
use routenet::http::status::HttpStatus;
use routenet::route::{AttrValue, RequestContext};

/// What an accept loop would hand out: the peer address stands in for the socket.
struct Peer {
    addr: SocketAddr,
}

#[derive(Debug, PartialEq)]
struct User {
    name: String,
}

fn authenticate(ctx: &mut RequestContext<'_, Peer>) {
    let Some(token) = ctx.request().header("Authorization") else {
        ctx.response_mut().set_status(HttpStatus::Unauthorized);
        return;
    };
    let user = User {
        name: token.trim_start_matches("Bearer ").to_string(),
    };
    let peer = ctx.transport().addr.to_string();
    ctx.set("authenticated", true)
        .set("user", AttrValue::extension(user))
        .set("peer", peer);
}

fn greet(ctx: &mut RequestContext<'_, Peer>) {
    if ctx.get("authenticated").and_then(AttrValue::as_bool) != Some(true) {
        return;
    }
    let name = ctx
        .get("user")
        .and_then(AttrValue::downcast_ref::<User>)
        .map(|u| u.name.clone())
        .unwrap_or_default();
    ctx.response_mut()
        .set_header("Content-Type", "text/plain")
        .set_content(format!("hello {name}"));
}

#[test]
fn authenticated_request_runs_through_pipeline() {
    let peer = Peer {
        addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 50000)),
    };
    let req = HttpRequest::new(HttpMethod::Get, "/hello")
        .with_header("Host", "localhost")
        .with_header("Authorization", "Bearer alice");

    let mut ctx = RequestContext::new(&peer, &req);
    authenticate(&mut ctx);
    greet(&mut ctx);
    encoding::apply(&mut ctx);

    assert_eq!(ctx.get("peer").and_then(AttrValue::as_str), Some("127.0.0.1:50000"));

    let at = UNIX_EPOCH + Duration::from_secs(1_704_067_200);
    let out = ctx.into_response().serialize_at(at);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 200 OK\r\n\
         Date: Mon, 01 Jan 2024 00:00:00 GMT\r\n\
         Connection: close\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: 11\r\n\
         \r\n\
         hello alice"
    );
}

#[test]
fn anonymous_request_is_rejected() {
    let peer = Peer {
        addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 50001)),
    };
    let req = HttpRequest::new(HttpMethod::Get, "/hello").with_header("Host", "localhost");

    let mut ctx = RequestContext::new(&peer, &req);
    authenticate(&mut ctx);
    greet(&mut ctx);

    assert!(ctx.get("authenticated").is_none());
    let out = ctx.into_response().serialize();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 401 Unauthorized\r\n"));
    assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
}
