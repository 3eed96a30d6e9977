//! Screen state and the transitions applied to it by user actions and
//! backend events. Transitions return the backend commands they need
//! instead of sending them, so they can be exercised without a worker.

use client_core::{FetchRequest, FormPhase, FormState};
use shared::domain::Coordinates;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{describe_submit_failure, UiError, UiEvent};

pub const SUBMIT_SUCCESS_MESSAGE: &str = "Collect point created!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Home,
    CreatePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBannerSeverity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusBanner {
    pub severity: StatusBannerSeverity,
    pub message: String,
}

pub struct Screen {
    pub view: AppView,
    pub form: FormState,
    pub status: String,
    pub status_banner: Option<StatusBanner>,
    /// Bumped every time a fresh form is opened.
    pub epoch: u64,
    fallback_position: Coordinates,
}

impl Screen {
    pub fn new(fallback_position: Coordinates) -> Self {
        Self {
            view: AppView::Home,
            form: FormState::new(fallback_position),
            status: "Starting".to_string(),
            status_banner: None,
            epoch: 0,
            fallback_position,
        }
    }

    fn fetch(&self, request: FetchRequest) -> BackendCommand {
        BackendCommand::Fetch {
            epoch: self.epoch,
            request,
        }
    }

    /// Opens an empty form and starts its mount-time fetches.
    pub fn open_create_point(&mut self) -> Vec<BackendCommand> {
        self.epoch += 1;
        self.view = AppView::CreatePoint;
        self.form = FormState::new(self.fallback_position);
        self.status_banner = None;
        let requests = self.form.load_initial_data();
        requests.into_iter().map(|r| self.fetch(r)).collect()
    }

    pub fn back_home(&mut self) {
        self.epoch += 1;
        self.view = AppView::Home;
    }

    pub fn select_state(&mut self, state: Option<String>) -> Option<BackendCommand> {
        let request = self.form.select_state(state)?;
        Some(self.fetch(request))
    }

    pub fn retry_failed(&mut self) -> Vec<BackendCommand> {
        let requests = self.form.retry_failed();
        requests.into_iter().map(|r| self.fetch(r)).collect()
    }

    pub fn submit(&mut self) -> Option<BackendCommand> {
        match self.form.begin_submit() {
            Ok(request) => {
                self.status = "Saving collect point...".to_string();
                self.status_banner = None;
                Some(BackendCommand::Submit {
                    epoch: self.epoch,
                    request,
                })
            }
            Err(rejected) => {
                tracing::debug!("submit ignored: {rejected}");
                None
            }
        }
    }

    pub fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Error(err) => {
                self.show_error(&err);
            }
            UiEvent::Fetched { epoch, outcome } => {
                if epoch != self.epoch {
                    tracing::debug!(epoch, current = self.epoch, "dropping result for closed form");
                    return;
                }
                self.form.apply(outcome);
            }
            UiEvent::SubmitFinished { epoch, result } => {
                if epoch != self.epoch {
                    // Form closed mid-save: report the outcome in the status line only.
                    self.status = match &result {
                        Ok(()) => SUBMIT_SUCCESS_MESSAGE.to_string(),
                        Err(err) => describe_submit_failure(&err.to_string()),
                    };
                    tracing::info!(epoch, ok = result.is_ok(), "submit finished after form closed");
                    return;
                }
                self.form.finish_submit(result);
                match self.form.phase().clone() {
                    FormPhase::Submitted => {
                        self.status = SUBMIT_SUCCESS_MESSAGE.to_string();
                        self.status_banner = Some(StatusBanner {
                            severity: StatusBannerSeverity::Success,
                            message: SUBMIT_SUCCESS_MESSAGE.to_string(),
                        });
                        self.back_home();
                    }
                    FormPhase::Failed(err) => {
                        let err = UiError::from_form_error(&err);
                        self.status = describe_submit_failure(err.message());
                        self.show_error(&err);
                    }
                    _ => {}
                }
            }
        }
    }

    fn show_error(&mut self, err: &UiError) {
        tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
        self.status_banner = Some(StatusBanner {
            severity: StatusBannerSeverity::Error,
            message: err.message().to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::FetchOutcome;
    use shared::{
        domain::{CollectItem, FormField, ItemId},
        error::{FormError, Resource},
    };

    fn opened() -> (Screen, Vec<BackendCommand>) {
        let mut screen = Screen::new(Coordinates::new(-15.8, -47.9));
        let cmds = screen.open_create_point();
        (screen, cmds)
    }

    fn city_generation(cmd: Option<BackendCommand>) -> u64 {
        match cmd {
            Some(BackendCommand::Fetch {
                request: FetchRequest::Cities { generation, .. },
                ..
            }) => generation,
            _ => panic!("expected a city fetch"),
        }
    }

    #[test]
    fn opening_form_queues_three_fetches_for_current_epoch() {
        let (screen, cmds) = opened();
        assert_eq!(screen.view, AppView::CreatePoint);
        assert_eq!(cmds.len(), 3);
        assert!(cmds.iter().all(|cmd| matches!(
            cmd,
            BackendCommand::Fetch { epoch, .. } if *epoch == screen.epoch
        )));
    }

    #[test]
    fn results_for_a_closed_form_are_dropped() {
        let (mut screen, _) = opened();
        let stale_epoch = screen.epoch;
        screen.back_home();
        screen.open_create_point();

        screen.apply_event(UiEvent::Fetched {
            epoch: stale_epoch,
            outcome: FetchOutcome::Items(Ok(vec![CollectItem {
                id: ItemId(1),
                title: "Lâmpadas".into(),
                image_url: String::new(),
            }])),
        });
        assert!(screen.form.items().is_loading());
    }

    #[test]
    fn stale_city_results_do_not_replace_latest() {
        let (mut screen, _) = opened();
        let sp = city_generation(screen.select_state(Some("SP".into())));
        let rj = city_generation(screen.select_state(Some("RJ".into())));

        let epoch = screen.epoch;
        screen.apply_event(UiEvent::Fetched {
            epoch,
            outcome: FetchOutcome::Cities {
                generation: rj,
                result: Ok(vec!["Niterói".into()]),
            },
        });
        screen.apply_event(UiEvent::Fetched {
            epoch,
            outcome: FetchOutcome::Cities {
                generation: sp,
                result: Ok(vec!["Campinas".into()]),
            },
        });

        assert_eq!(
            screen.form.cities().ready().cloned(),
            Some(vec!["Niterói".to_string()])
        );
    }

    #[test]
    fn successful_submit_notifies_and_returns_home() {
        let (mut screen, _) = opened();
        screen.form.set_field(FormField::Name, "Recicla");
        let cmd = screen.submit().expect("submit command");
        let BackendCommand::Submit { epoch, request } = cmd else {
            panic!("expected submit command");
        };
        assert_eq!(request.name, "Recicla");

        screen.apply_event(UiEvent::SubmitFinished {
            epoch,
            result: Ok(()),
        });
        assert_eq!(screen.view, AppView::Home);
        let banner = screen.status_banner.as_ref().expect("banner");
        assert_eq!(banner.severity, StatusBannerSeverity::Success);
        assert_eq!(banner.message, SUBMIT_SUCCESS_MESSAGE);
    }

    #[test]
    fn failed_submit_stays_on_form_with_error() {
        let (mut screen, _) = opened();
        screen.form.set_field(FormField::Email, "a@b.c");
        let epoch = screen.epoch;
        screen.submit().expect("submit command");

        screen.apply_event(UiEvent::SubmitFinished {
            epoch,
            result: Err(FormError::submission("failed to reach collect point endpoint")),
        });
        assert_eq!(screen.view, AppView::CreatePoint);
        assert_eq!(screen.form.data().email, "a@b.c");
        assert_eq!(
            screen.status_banner.as_ref().map(|b| b.severity),
            Some(StatusBannerSeverity::Error)
        );
        assert!(screen.status.contains("unreachable"));
    }

    #[test]
    fn submit_finishing_after_leaving_form_is_still_reported() {
        let (mut screen, _) = opened();
        let epoch = screen.epoch;
        screen.submit().expect("submit command");
        screen.back_home();

        screen.apply_event(UiEvent::SubmitFinished {
            epoch,
            result: Ok(()),
        });
        assert_eq!(screen.view, AppView::Home);
        assert_eq!(screen.status, SUBMIT_SUCCESS_MESSAGE);

        screen.apply_event(UiEvent::SubmitFinished {
            epoch,
            result: Err(FormError::submission("failed to reach collect point endpoint")),
        });
        assert!(screen.status.contains("unreachable"));
    }

    #[test]
    fn double_submit_queues_one_command() {
        let (mut screen, _) = opened();
        assert!(screen.submit().is_some());
        assert!(screen.submit().is_none());
    }

    #[test]
    fn retry_targets_failed_slices_in_current_epoch() {
        let (mut screen, _) = opened();
        let epoch = screen.epoch;
        screen.apply_event(UiEvent::Fetched {
            epoch,
            outcome: FetchOutcome::States(Err(FormError::fetch(Resource::States, "offline"))),
        });

        let cmds = screen.retry_failed();
        assert_eq!(cmds.len(), 1);
        assert!(matches!(
            &cmds[0],
            BackendCommand::Fetch {
                request: FetchRequest::States,
                epoch: e,
            } if *e == epoch
        ));
    }
}
