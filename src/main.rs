use shard_cluster::client::MasterClient;
use shard_cluster::shardkv::handlers::kv_router;
use shard_cluster::shardkv::memory::ShardKv;
use shard_cluster::shardkv::reconciler::run_reconciler;
use shard_cluster::shardmaster::handlers::master_router;
use shard_cluster::shardmaster::service::ShardMaster;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut role: Option<String> = None;
    let mut bind_addr: Option<SocketAddr> = None;
    let mut master_addr: Option<String> = None;
    let mut join = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--role" => {
                role = Some(args[i + 1].clone());
                i += 2;
            }
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--shardmaster" => {
                master_addr = Some(args[i + 1].clone());
                i += 2;
            }
            "--join" => {
                join = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    let (Some(role), Some(bind_addr)) = (role, bind_addr) else {
        usage(&args[0]);
        std::process::exit(1);
    };

    match role.as_str() {
        "shardmaster" => {
            let master = ShardMaster::new();
            let app = master_router(master);

            tracing::info!("shardmaster listening on {}", bind_addr);
            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, app).await?;
        }
        "shardkv" => {
            let Some(master_addr) = master_addr else {
                eprintln!("--shardmaster <addr:port> is required for the shardkv role");
                std::process::exit(1);
            };

            let address = bind_addr.to_string();
            let kv = ShardKv::new(address.clone(), master_addr.clone());

            if join {
                MasterClient::new(master_addr).join(&address).await?;
                tracing::info!("registered {} with the shardmaster", address);
            }

            let reconciler_kv = kv.clone();
            tokio::spawn(async move {
                run_reconciler(reconciler_kv).await;
            });

            let app = kv_router(kv);

            tracing::info!("shardkv listening on {}", bind_addr);
            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, app).await?;
        }
        other => {
            eprintln!("unknown role: {}", other);
            usage(&args[0]);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} --role <shardmaster|shardkv> --bind <addr:port> [--shardmaster <addr:port>] [--join]",
        program
    );
    eprintln!("Example: {} --role shardmaster --bind 127.0.0.1:6000", program);
    eprintln!(
        "Example: {} --role shardkv --bind 127.0.0.1:7001 --shardmaster 127.0.0.1:6000 --join",
        program
    );
}
