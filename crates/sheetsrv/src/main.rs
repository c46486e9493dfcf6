use std::sync::Arc;

use clap::Parser;
use sheets_client::client::ReqwestClient;
use sheets_client::memory::MemorySpreadsheets;
use sheets_client::operations::Operations;
use sheets_client::provider::{ClientProvider, ServiceAccountProvider, StaticProvider};
use sheetsrv::args::Arguments;
use sheetsrv::errors::ServerResult;
use sheetsrv::handlers::ServerState;
use sheetsrv::server;
use tokio::net::TcpListener;
use tracing::{info, warn};

fn main() {
    // Missing .env is fine, it only feeds the env fallbacks of the args.
    let dotenv = dotenvy::dotenv();

    let args = Arguments::parse();
    logutil::configure_global_logger(
        logutil::level_for_verbosity(args.verbose),
        args.log_format,
    );

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sheetsrv")
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            println!("ERROR: failed to build runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(inner(args)) {
        println!("ERROR: {e}");
        std::process::exit(1);
    }
}

async fn inner(args: Arguments) -> ServerResult<()> {
    let provider: Arc<dyn ClientProvider> = if args.in_memory {
        warn!(
            credentials = %args.credentials.display(),
            reuse_token = args.reuse_token,
            "serving spreadsheets from memory, credentials are ignored"
        );
        Arc::new(StaticProvider::new(Arc::new(MemorySpreadsheets::new())))
    } else {
        let provider =
            ServiceAccountProvider::new(ReqwestClient::default(), args.credentials, args.endpoint)
                .with_token_reuse(args.reuse_token);
        info!(
            credentials = %provider.key_path().display(),
            reuse_token = args.reuse_token,
            "using service account credentials"
        );
        Arc::new(provider)
    };

    let state = Arc::new(ServerState {
        operations: Operations::new(provider),
    });

    let listener = TcpListener::bind(&args.bind).await?;
    server::serve(listener, state).await
}
