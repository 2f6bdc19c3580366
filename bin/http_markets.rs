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

//! Example demonstrating Capital.com REST API usage.
//!
//! Creates a session, then queries accounts, markets, and historical prices.
//! Without credentials only the public server time endpoint is exercised.
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
//! # Live environment
//! cargo run --bin capitalcom-http
//!
//! # Demo environment
//! cargo run --bin capitalcom-http -- --demo
//! ```

use capitalcom::{
    common::enums::CapitalComResolution,
    http::{
        client::CapitalComHttpClient,
        error::CapitalComHttpError,
        query::{GetPricesParams, MarketSearchParams},
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let demo = std::env::args().any(|a| a == "--demo");
    tracing::info!(
        "Starting Capital.com HTTP example ({})",
        if demo { "demo" } else { "live" }
    );

    let client = CapitalComHttpClient::new_with_env(None, None, None, demo, Some(30))?;

    let server_time = client.get_server_time().await?;
    tracing::info!("Server time: {}", server_time.server_time);

    match client.create_session().await {
        Ok(session) => {
            tracing::info!(
                "Logged in as {} ({})",
                session.current_account_id,
                session.currency_iso_code,
            );
        }
        Err(CapitalComHttpError::MissingCredentials) => {
            tracing::warn!(
                "No credentials found, set CAPITALCOM_API_KEY, CAPITALCOM_IDENTIFIER, \
                 and CAPITALCOM_PASSWORD for authenticated endpoints"
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let accounts = client.get_accounts().await?;
    for account in &accounts.accounts {
        tracing::info!(
            "Account {} ({}): balance {}",
            account.account_id,
            account.account_name,
            account.balance.balance,
        );
    }

    let markets = client
        .search_markets(MarketSearchParams::from_search_term("silver"))
        .await?;
    tracing::info!("Found {} markets matching 'silver'", markets.markets.len());

    let details = client.get_market_details("SILVER").await?;
    tracing::info!(
        "SILVER: {} ({})",
        details.instrument.name,
        details.snapshot.market_status,
    );

    let prices = client
        .get_prices("SILVER", GetPricesParams::new(CapitalComResolution::Hour, 10))
        .await?;
    for price in &prices.prices {
        tracing::info!(
            "{} close bid={:?} ask={:?}",
            price.snapshot_time,
            price.close_price.bid,
            price.close_price.ask,
        );
    }

    client.logout().await?;
    tracing::info!("Session closed");

    Ok(())
}
