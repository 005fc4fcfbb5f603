use rocket::fairing::AdHoc;
use rocket::http::Header;

const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Credentials", "true"),
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET,OPTIONS,PATCH,DELETE,POST,PUT",
    ),
    (
        "Access-Control-Allow-Headers",
        "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, Content-Length, Content-MD5, Content-Type, Date, X-Api-Version",
    ),
];

/// Permissive CORS headers on every response, error responses included
pub fn stage() -> AdHoc {
    AdHoc::on_response("CORS Headers", |_req, res| {
        Box::pin(async move {
            for (name, value) in CORS_HEADERS {
                res.set_header(Header::new(*name, *value));
            }
        })
    })
}
