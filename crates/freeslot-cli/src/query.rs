use freeslot_auth::TokenProvider;
use freeslot_calendar::{Calendar, CalendarClient, CalendarError};
use freeslot_core::{AppError, Config};
use freeslot_schedule::{render_day_rows, DayRow, QueryContext, QueryRequest, RowStyle};
use tracing::instrument;

/// Validate `request`, filling unset times and zone from `config`.
///
/// # Errors
/// [`AppError::Input`] for anything the user has to fix.
pub fn build_context(request: &QueryRequest, config: &Config) -> Result<QueryContext, AppError> {
    let window = config.window.day_window()?;
    Ok(request.validate(&window, config.time_zone())?)
}

/// Every calendar on the signed-in user's list.
///
/// # Errors
/// Token or provider failures.
pub async fn list_calendars<T: TokenProvider>(
    tokens: &T,
    api_base_url: &str,
) -> Result<Vec<Calendar>, AppError> {
    let token = tokens.get_token().await?;
    let client = CalendarClient::with_base_url(&token, api_base_url);
    client.list_calendars().await.map_err(calendar_failure)
}

/// One `freeslot calendars` line: id, name, access and zone, tab separated.
pub fn calendar_line(calendar: &Calendar, excluded: bool) -> String {
    let mut line = format!(
        "{}\t{}\t{}",
        calendar.id, calendar.display_name, calendar.access_role
    );
    if let Some(zone) = &calendar.time_zone {
        line.push('\t');
        line.push_str(zone);
    }
    if calendar.is_primary {
        line.push_str(" (primary)");
    }
    if excluded {
        line.push_str(" (excluded)");
    }
    line
}

/// Log what the user can do about a provider failure, then convert it.
fn calendar_failure(err: CalendarError) -> AppError {
    if err.should_refresh_token() {
        tracing::warn!("Calendar API refused the stored token, run `freeslot login`: {}", err);
    } else if err.is_retryable() {
        tracing::warn!("Calendar API unavailable, try again later: {}", err);
    }
    err.into()
}

/// Fetch busy data for `ctx` and compute one row per date.
///
/// Excluded calendars are left out of the freeBusy request.
///
/// # Errors
/// Token or provider failures. The first one aborts the query.
#[instrument(skip_all, fields(start = %ctx.start_date, end = %ctx.end_date, mode = %ctx.mode))]
pub async fn fetch_day_rows<T: TokenProvider>(
    ctx: &QueryContext,
    tokens: &T,
    api_base_url: &str,
) -> Result<Vec<DayRow>, AppError> {
    let token = tokens.get_token().await?;
    let client = CalendarClient::with_base_url(&token, api_base_url);

    let calendar_ids: Vec<String> = client
        .list_calendars()
        .await
        .map_err(calendar_failure)?
        .into_iter()
        .map(|calendar| calendar.id)
        .filter(|id| !ctx.is_excluded(id))
        .collect();
    tracing::info!(
        calendars = calendar_ids.len(),
        excluded = ctx.excluded.len(),
        "Querying busy times"
    );

    let busy = client
        .query_free_busy(ctx.time_min(), ctx.time_max(), &calendar_ids)
        .await
        .map_err(calendar_failure)?;
    Ok(ctx.day_rows(&busy))
}

/// Validate, fetch and render in one go.
///
/// Validation runs before any token or network call.
///
/// # Errors
/// See [`build_context`] and [`fetch_day_rows`].
pub async fn run_query<T: TokenProvider>(
    request: &QueryRequest,
    config: &Config,
    tokens: &T,
    style: RowStyle,
) -> Result<String, AppError> {
    let ctx = build_context(request, config)?;
    let rows = fetch_day_rows(&ctx, tokens, &config.calendar.api_base_url).await?;
    Ok(render_day_rows(&rows, &ctx.time_zone, style))
}
