use pos_backoffice::{
    client::{ApiClient, CashAggregator, CashPhase, RefreshScheduler},
    config::MonitorConfig,
    format::format_xaf,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = MonitorConfig::from_env()?;

    let mut client = ApiClient::new(&config.api_url, config.http_timeout)?;
    let session = client.login(&config.email, &config.password).await?;
    tracing::info!(
        user = %session.user.name,
        role = %session.user.role,
        period = config.period.as_str(),
        "monitoring cash drawer"
    );

    let scheduler = RefreshScheduler::new(config.poll_interval);
    let period = config.period;
    let fetcher = client.clone();
    let mut updates = scheduler.subscribe(period, move || {
        let client = fetcher.clone();
        async move { client.cash_drawer(period, None).await }
    });
    let mut cash = CashAggregator::new(client, period);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(result) = updates.borrow_and_update().clone() else {
                    continue;
                };
                cash.apply(result);
                report(&cash);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    scheduler.shutdown().await;
    Ok(())
}

fn report(cash: &CashAggregator<ApiClient>) {
    let Some(snapshot) = cash.snapshot() else {
        return;
    };
    let stale = cash.phase() == CashPhase::Error;
    tracing::info!(
        date = %snapshot.date,
        payments_in = %format_xaf(snapshot.payments_in),
        vouchers_in = %format_xaf(snapshot.vouchers_in),
        vouchers_out = %format_xaf(snapshot.vouchers_out),
        total_cash = %format_xaf(snapshot.total_cash),
        drawer_cash = %format_xaf(snapshot.drawer_cash()),
        stale,
        "cash drawer"
    );
}
