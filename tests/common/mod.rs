#![allow(dead_code)]

// Shared fixtures for integration tests.
//
// Every token below was produced by Django's `signing.dumps` with the session backend salt. All
// except the two `*_2014` tokens were issued at 2014-10-14 00:00:00 UTC.
use axum::body::Body;
use http_body_util::BodyExt as _;
use time::{OffsetDateTime, macros::datetime};

use django_cookie_session::FixedClock;

pub const SECRET: &str = "70e97f01975bb59ae8804ca164081c46034042aa913a4dac055cad6a7e188bd1";
pub const OLD_SECRET: &str = "old-secret-key-that-was-rotated";
pub const SHORT_SECRET: &str = "s3cr3t";

/// Pickled `{"_auth_user_backend": "some.sweet.Backend", "_auth_user_id": 1334}`.
pub const PICKLE_2014: &str = ".eJxrYKotZNQI5Y1PLC3JiC8tTi2Kz0wpZPI1Yw0VQhJLSkzOTs1LKWQOFSrOz03VKy5PTS3Rc4KIluoBAEyaGG0:1XeDNx:RIsFaf0wIba2w-wXrFz47me6Zcw";
/// Same session as JSON.
pub const JSON_2014: &str = ".eJyrVopPLC3JiC8tTi2Kz0xRsjI0NjbRQRZMSkzOTs0DyigV5-em6hWXp6aW6DlBBWsB4AYWwQ:1XeDSa:WrnCueUH3vz5K8cZidNGZSd-zQw";

pub const JSON_PLAIN: &str = "eyJ1c2VyIjoiYWxpY2UiLCJyb2xlcyI6WyJhZG1pbiIsInN0YWZmIl0sImFjdGl2ZSI6dHJ1ZSwic2NvcmUiOjIuNSwibm90aGluZyI6bnVsbCwibmVzdGVkIjp7ImsiOjF9fQ:1XdpWy:X97cOR3PZrrSRlW4rzv_2md9dYs";
pub const JSON_LIST: &str = "WzEsMiwzXQ:1XdpWy:59xzcO4UgCa6icraeTS6DlH_LWo";
pub const JSON_SHA256: &str =
    "eyJfYXV0aF91c2VyX2lkIjoiNDIifQ:1XdpWy:xKyb3xM8dLc9739cemwjAasaqFBdS1EExqfnPBxN84Q";
pub const JSON_OLD_SECRET: &str = "eyJ0aGVtZSI6ImRhcmsifQ:1XdpWy:KI5beDqYuqwtCxpXON-2bTnQmLo";
pub const JSON_UNPADDED: &str = "eyJhIjoiYmNkIn0:1XdpWy:bCmu-gSCv4D-4d_ROk356l9XJJA";
pub const JSON_SHORT_SECRET: &str = "eyJrIjoidiJ9:1XdpWy:vGJa8Sn8g0EYR6COOr56r3rZ9Ws";

pub const PICKLE_PROTOCOL_4: &str = ".eJxrYJlayQABtVM0elhKi1OLpvSwJuZkJqcC6aL8nNTiKbFAGdbElNzMPKBQcUliWtqU1B62xOSSzLLUKR1AoeT8otQp7g4sEIN62PPySzIy89Kn-PWw5aUWl6SmTKmd0sOYPcXr5____4t7mJMy06d0sYEVM5bqAQDkHC7l:1XdpWy:fiPqwQpq5DoCNarcsqDl9haY95I";
pub const PICKLE_PROTOCOL_0: &str = "KGRwMApWbmFtZQpwMQpWYm9iCnAyCnNWY291bnQKcDMKSTMKc1ZvawpwNApJMDAKc1ZyYXRpbwpwNQpGMC4yNQpzLg:1XdpWy:OeAy7Z62mujtEnAFRGpGRgURLv4";
pub const PICKLE_GLOBAL: &str = ".eJxrYKotZIhgYWBgKM9IzStkTE5JLEktycxN5QIxuAqZkuOT81NSk4u5UvNADK5C5ghWoGr2w_O4-ApZItiA7JzEksw8w0LWtkK2oEL21kKOoELOYj0ApwQZkA:1XdpWy:DG28Q1AdkiSKBmOjggHstPthxE8";
pub const PICKLE_INT_KEY: &str = "gAJ9cQBLAVgDAAAAb25lcQFzLg:1XdpWy:psKmjU7eqblnVo8DQuqgEQ1ESLU";
pub const PICKLE_SHARED: &str = "gAJ9cQAoWAEAAABhcQFdcQIoSwFYAQAAAHhxA2VYAQAAAGJxBGgCWAEAAAB0cQVLAUdAAAAAAAAAAIZxBlgBAAAAdXEHWAMAAABow6lxCHUu:1XdpWy:MZL57zrD9afQhFyaXCTpdBuGQE0";
pub const PICKLE_CYCLE: &str = "gAJ9cQBYBAAAAGxvb3BxAV1xAmgCYXMu:1XdpWy:ouMSdPz8kQSowO3M0GXSLljuIaY";

/// Issue time of the `*_2014` fixtures plus fourteen days.
pub const PICKLE_2014_DEADLINE: OffsetDateTime = datetime!(2014-10-29 01:28:17 UTC);

pub fn clock_2014() -> FixedClock {
    FixedClock::new(datetime!(2014-10-15 0:00 UTC))
}

pub fn clock_at(at: OffsetDateTime) -> FixedClock {
    FixedClock::new(at)
}

pub async fn body_string(body: Body) -> String {
    let bytes = body
        .collect()
        .await
        .expect("body collects successfully")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}
