use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::api::traits::BudgetApi;
use crate::errors::CoreError;
use crate::models::calendar::{months_in_calendar_order, FilterSelection, Month};
use crate::models::notice::Notice;
use crate::models::summary::{BudgetStatus, SummaryView};

use super::sequencer::{FetchState, RequestSequencer, Resolution, Ticket};
use super::session_service::{SessionScoped, SessionStore};

pub const SELECT_YEAR_AND_MONTH: &str = "Please select a year and month";
pub const SUMMARY_FAILED: &str = "Failed to fetch summary";
pub const YEARS_FAILED: &str = "Failed to fetch available years";
pub const MONTHS_FAILED: &str = "Failed to fetch available months";

/// The three dependent fetches behind the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Years,
    Months,
    Summary,
}

impl FetchKind {
    pub const ALL: [FetchKind; 3] = [FetchKind::Years, FetchKind::Months, FetchKind::Summary];
}

/// Everything the dashboard renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub selection: FilterSelection,
    pub years: FetchState<Vec<i32>>,
    pub months: FetchState<Vec<Month>>,
    pub summary: FetchState<SummaryView>,
    pub notice: Option<Notice>,
}

impl DashboardState {
    pub fn available_years(&self) -> &[i32] {
        self.years.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Months with data for the selected year, in calendar order.
    pub fn available_months(&self) -> &[Month] {
        self.months.value().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self) -> Option<&SummaryView> {
        self.summary.value()
    }

    /// `Error` after a failed summary fetch, the summary's own status after a
    /// successful one, nothing before the first result.
    pub fn status(&self) -> Option<BudgetStatus> {
        match &self.summary {
            FetchState::Applied(_, view) => Some(view.status),
            FetchState::Failed(_) => Some(BudgetStatus::Error),
            _ => None,
        }
    }

    /// A summary fetch is in flight (the "Show" control spins).
    pub fn loading(&self) -> bool {
        self.summary.is_pending()
    }

    /// The month selector is only usable once months are known.
    pub fn month_selector_enabled(&self) -> bool {
        !self.available_months().is_empty()
    }
}

/// Drives the year → months → summary cascade.
///
/// Every fetch takes a ticket from a per-kind sequencer when it is issued.
/// When the response arrives it is applied only if no newer fetch of the same
/// kind has been issued since; older responses are dropped, so a slow answer
/// for a previous selection can never overwrite the current one.
///
/// Ending the session resets the whole dashboard and makes every in-flight
/// fetch stale.
pub struct DashboardOrchestrator {
    api: Arc<dyn BudgetApi>,
    session: Arc<SessionStore>,
    board: Arc<Board>,
}

struct Board {
    state: watch::Sender<DashboardState>,
    sequencer: Mutex<RequestSequencer<FetchKind>>,
}

impl Board {
    fn lock_sequencer(&self) -> std::sync::MutexGuard<'_, RequestSequencer<FetchKind>> {
        self.sequencer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionScoped for Board {
    fn session_ended(&self) {
        self.state.send_modify(|s| {
            let mut sequencer = self.lock_sequencer();
            for kind in FetchKind::ALL {
                sequencer.invalidate(kind);
            }
            *s = DashboardState::default();
        });
    }
}

impl DashboardOrchestrator {
    pub fn new(api: Arc<dyn BudgetApi>, session: Arc<SessionStore>) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        let board = Arc::new(Board {
            state,
            sequencer: Mutex::new(RequestSequencer::new()),
        });
        let scoped: Arc<dyn SessionScoped> = board.clone();
        session.attach(&scoped);
        Self {
            api,
            session,
            board,
        }
    }

    pub fn snapshot(&self) -> DashboardState {
        self.board.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.board.state.subscribe()
    }

    pub fn dismiss_notice(&self) {
        self.board.state.send_if_modified(|s| s.notice.take().is_some());
    }

    /// Select the month containing `today`, then fetch its summary, the years
    /// list and that year's months concurrently. The summary does not wait
    /// for either list.
    pub async fn mount(&self, today: NaiveDate) {
        let selection = FilterSelection::for_date(today);
        self.board.state.send_modify(|s| s.selection = selection);
        let Some((year, month)) = selection.summary_key() else {
            return;
        };
        tracing::debug!(year, month = month.number(), "dashboard mounted");

        let _ = tokio::join!(
            self.fetch_summary(year, month),
            self.fetch_years(),
            self.fetch_months(year),
        );
    }

    /// Change (or clear) the selected year.
    ///
    /// A set year refetches its months, and the summary too if a month is
    /// selected. Clearing the year empties the months list and drops any
    /// months or summary response still in flight; an applied summary stays.
    pub async fn select_year(&self, year: Option<i32>) {
        let mut selection = FilterSelection::default();
        self.board.state.send_modify(|s| {
            s.selection.year = year;
            selection = s.selection;
        });

        match selection.year {
            Some(year) => match selection.month {
                Some(month) => {
                    let _ = tokio::join!(self.fetch_months(year), self.fetch_summary(year, month));
                }
                None => {
                    let _ = self.fetch_months(year).await;
                }
            },
            None => self.board.state.send_modify(|s| {
                let mut sequencer = self.board.lock_sequencer();
                sequencer.invalidate(FetchKind::Months);
                sequencer.invalidate(FetchKind::Summary);
                s.months = FetchState::Idle;
                if s.summary.is_pending() {
                    s.summary = FetchState::Idle;
                }
            }),
        }
    }

    /// Change (or clear) the selected month; refetch the summary when a year is set too.
    pub async fn select_month(&self, month: Option<Month>) {
        let mut selection = FilterSelection::default();
        self.board.state.send_modify(|s| {
            s.selection.month = month;
            selection = s.selection;
        });

        if let Some((year, month)) = selection.summary_key() {
            let _ = self.fetch_summary(year, month).await;
        }
    }

    /// [`DashboardOrchestrator::select_month`] from a raw month number.
    pub async fn select_month_number(&self, month: Option<u32>) -> Result<(), CoreError> {
        let month = match month {
            Some(number) => match Month::try_from_number(number) {
                Ok(month) => Some(month),
                Err(e) => {
                    self.board.state.send_modify(|s| s.notice = Some(Notice::warning(e.user_message())));
                    return Err(e);
                }
            },
            None => None,
        };
        self.select_month(month).await;
        Ok(())
    }

    /// The explicit "Show" action: fetch the summary for the current selection.
    ///
    /// With the year or month unset this posts a validation notice and makes
    /// no network call.
    pub async fn show(&self) -> Result<Resolution, CoreError> {
        let selection = self.board.state.borrow().selection;
        match selection.summary_key() {
            Some((year, month)) => self.fetch_summary(year, month).await,
            None => {
                self.board.state
                    .send_modify(|s| s.notice = Some(Notice::warning(SELECT_YEAR_AND_MONTH)));
                Err(CoreError::Validation(SELECT_YEAR_AND_MONTH.into()))
            }
        }
    }

    // ── Fetches ─────────────────────────────────────────────────────

    async fn fetch_summary(&self, year: i32, month: Month) -> Result<Resolution, CoreError> {
        let api = Arc::clone(&self.api);
        self.fetch(FetchKind::Summary, |s| &mut s.summary, SUMMARY_FAILED, move |token| async move {
            api.summary(&token, year, month.number())
                .await
                .map(SummaryView::from)
        })
        .await
    }

    async fn fetch_years(&self) -> Result<Resolution, CoreError> {
        let api = Arc::clone(&self.api);
        self.fetch(FetchKind::Years, |s| &mut s.years, YEARS_FAILED, move |token| async move {
            api.available_years(&token).await
        })
        .await
    }

    async fn fetch_months(&self, year: i32) -> Result<Resolution, CoreError> {
        let api = Arc::clone(&self.api);
        self.fetch(FetchKind::Months, |s| &mut s.months, MONTHS_FAILED, move |token| async move {
            api.available_months(&token, year)
                .await
                .map(|numbers| months_in_calendar_order(&numbers))
        })
        .await
    }

    /// Issue a ticket, run `request`, and apply its outcome to `slot` if the
    /// ticket is still the newest of its kind.
    async fn fetch<T, F, Fut>(
        &self,
        kind: FetchKind,
        slot: fn(&mut DashboardState) -> &mut FetchState<T>,
        failure: &'static str,
        request: F,
    ) -> Result<Resolution, CoreError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let token = self.session.credential()?;

        let ticket = self.board.lock_sequencer().issue(kind);
        self.board.state.send_modify(|s| *slot(s) = FetchState::Pending(ticket.seq));

        let result = self.session.screen(request(token).await).await;
        self.apply(ticket, slot, failure, result)
    }

    fn apply<T>(
        &self,
        ticket: Ticket<FetchKind>,
        slot: fn(&mut DashboardState) -> &mut FetchState<T>,
        failure: &'static str,
        result: Result<T, CoreError>,
    ) -> Result<Resolution, CoreError> {
        let mut result = Some(result);
        let mut outcome = Ok(Resolution::Stale);

        self.board.state.send_if_modified(|s| {
            if !self.board.lock_sequencer().is_current(ticket) {
                // A rejected credential is reported even though the board was reset.
                if let Some(Err(e)) = result.take() {
                    if e.is_auth() {
                        outcome = Err(e);
                    }
                }
                return false;
            }
            match result.take() {
                Some(Ok(value)) => {
                    *slot(s) = FetchState::Applied(ticket.seq, value);
                    outcome = Ok(Resolution::Applied);
                }
                Some(Err(e)) => {
                    *slot(s) = FetchState::Failed(ticket.seq);
                    s.notice = Some(Notice::error(failure));
                    outcome = Err(e);
                }
                None => return false,
            }
            true
        });

        match &outcome {
            Ok(Resolution::Stale) => {
                tracing::debug!(kind = ?ticket.kind, seq = ticket.seq, "discarded stale response");
            }
            Err(e) => tracing::warn!(kind = ?ticket.kind, error = %e, "{failure}"),
            Ok(Resolution::Applied) => {}
        }
        outcome
    }
}
