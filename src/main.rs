#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tradedocs_server::run().await
}
