// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Example demonstrating Capital.com WebSocket streaming.
//!
//! Creates a REST session, hands the session tokens to the streaming client,
//! and subscribes to live quotes for the given epics.
//!
//! # Environment Variables
//!
//! - `CAPITALCOM_API_KEY`: Your Capital.com API key
//! - `CAPITALCOM_IDENTIFIER`: Your account email
//! - `CAPITALCOM_PASSWORD`: Your API key password
//!
//! # Usage
//!
//! ```bash
//! # Stream GOLD and SILVER quotes from the demo environment
//! cargo run --bin capitalcom-ws -- --demo GOLD SILVER
//! ```

use capitalcom::http::client::CapitalComHttpClient;
use futures_util::StreamExt;
use tokio::{pin, signal};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let demo = args.iter().any(|a| a == "--demo");
    let epics: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(String::as_str)
        .collect();
    let epics = if epics.is_empty() {
        vec!["GOLD", "SILVER"]
    } else {
        epics
    };

    tracing::info!(
        "Starting Capital.com WebSocket example ({}, epics: {epics:?})",
        if demo { "demo" } else { "live" }
    );

    let http_client = CapitalComHttpClient::new_with_env(None, None, None, demo, Some(30))?;
    http_client.create_session().await?;

    let mut ws_client = http_client.streaming_client()?;
    ws_client.connect().await?;
    ws_client.wait_until_active(10.0).await?;
    tracing::info!("Connected to Capital.com WebSocket");

    ws_client.subscribe_market_data(&epics).await?;

    let sigint = signal::ctrl_c();
    pin!(sigint);

    let stream = ws_client.stream();
    tokio::pin!(stream);

    tracing::info!("Listening for quotes... Press Ctrl+C to exit");

    loop {
        tokio::select! {
            Some(event) = stream.next() => {
                tracing::info!("{event:?}");
            }
            _ = &mut sigint => {
                tracing::info!("Received SIGINT, closing connection...");
                ws_client.disconnect().await?;
                break;
            }
            else => break,
        }
    }

    http_client.logout().await?;
    tracing::info!("Capital.com WebSocket example finished");

    Ok(())
}
