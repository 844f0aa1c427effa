use std::env;

use referral_eng::csv::{read_proposals, write_records};
use referral_eng::directory::StaticDirectory;
use referral_eng::{Engine, Party};
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let usage = "usage: referral-eng <proposals.csv> <our-name> <peer>...";
    let path = args.next().expect(usage);
    let me = args.next().expect(usage);
    let peers: Vec<String> = args.collect();

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let directory = StaticDirectory::new(
        peers
            .iter()
            .map(|name| Party::new(name.as_str(), format!("{name}:key"))),
    );
    let mut engine = Engine::new(Party::new(me.as_str(), format!("{me}:key")), directory);

    let (proposal_sender, proposal_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in read_proposals(&path) {
            match result {
                Ok(proposal) => {
                    proposal_sender.send(proposal).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    engine.run(ReceiverStream::new(proposal_receiver)).await;

    write_records(engine.records());
}
