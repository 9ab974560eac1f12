use std::net::SocketAddr;

use axum::{Extension, Router, routing::get};
use django_cookie_session::{DjangoSession, DjangoSessionConfig, DjangoSessionLayer, Serializer};
use time::Duration;

async fn index(session: Option<Extension<DjangoSession>>) -> String {
    match session {
        Some(Extension(session)) => match session.get("_auth_user_id") {
            Some(user_id) => format!("logged in as {user_id:?}"),
            None => "anonymous session".to_owned(),
        },
        None => "no valid Django session".to_owned(),
    }
}

#[tokio::main]
async fn main() {
    // Must match the Django project's SECRET_KEY.
    let secret = std::env::var("DJANGO_SECRET_KEY").expect("DJANGO_SECRET_KEY is set");

    let session_config = DjangoSessionConfig::default()
        // Default: "sessionid"
        .with_name("sessionid")
        // Default: Serializer::Json
        .with_serializer(Serializer::Json)
        // Default: two weeks
        .with_max_age(Duration::weeks(2));
    let session_layer = DjangoSessionLayer::new(secret).with_config(session_config);

    let app = Router::new().route("/", get(index)).layer(session_layer);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("tcp listener binds successfully");
    let local_addr = listener.local_addr().expect("local address is available");
    println!("listening at http://{local_addr}");

    axum::serve(listener, app)
        .await
        .expect("server runs successfully");
}
