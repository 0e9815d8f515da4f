use tower_lsp::{LspService, Server};

use duality_lsp::DualityServer;

#[tokio::main]
async fn main() {
    env_logger::init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(DualityServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
