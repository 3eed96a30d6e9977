//! Form controller for registering a collect point.
//!
//! `FormState` owns every piece of form state. Network work never happens
//! here: transitions that need data return a [`FetchRequest`], and the caller
//! feeds the eventual [`FetchOutcome`] back through [`FormState::apply`].
//! City lists are keyed by a request generation so a late response for a
//! state the user already moved away from is dropped.

use std::collections::BTreeSet;

use shared::{
    domain::{City, CollectItem, Coordinates, FormData, FormField, GeoState, ItemId},
    error::FormError,
    protocol::CreatePointRequest,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slice<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(FormError),
}

impl<T> Slice<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Slice::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FormError> {
        match self {
            Slice::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slice::Loading)
    }

    fn from_result(result: Result<T, FormError>) -> Self {
        match result {
            Ok(value) => Slice::Ready(value),
            Err(err) => Slice::Failed(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Editing,
    Submitting,
    Submitted,
    Failed(FormError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Location,
    Items,
    States,
    Cities { state: String, generation: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Location(Result<Coordinates, FormError>),
    Items(Result<Vec<CollectItem>, FormError>),
    States(Result<Vec<GeoState>, FormError>),
    Cities {
        generation: u64,
        result: Result<Vec<City>, FormError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a submission is already in flight")]
    InFlight,
    #[error("this collect point was already submitted")]
    AlreadySubmitted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    data: FormData,
    location: Slice<Coordinates>,
    fallback_position: Coordinates,
    selected_position: Coordinates,
    items: Slice<Vec<CollectItem>>,
    states: Slice<Vec<GeoState>>,
    cities: Slice<Vec<City>>,
    selected_state: Option<String>,
    selected_city: Option<String>,
    selected_items: BTreeSet<ItemId>,
    city_generation: u64,
    phase: FormPhase,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(Coordinates::default())
    }
}

fn normalize_choice(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FormState {
    pub fn new(fallback_position: Coordinates) -> Self {
        Self {
            data: FormData::default(),
            location: Slice::Idle,
            fallback_position,
            selected_position: Coordinates::default(),
            items: Slice::Idle,
            states: Slice::Idle,
            cities: Slice::Idle,
            selected_state: None,
            selected_city: None,
            selected_items: BTreeSet::new(),
            city_generation: 0,
            phase: FormPhase::Idle,
        }
    }

    /// Starts the three mount-time fetches. They are independent and may
    /// resolve in any order.
    pub fn load_initial_data(&mut self) -> Vec<FetchRequest> {
        self.location = Slice::Loading;
        self.items = Slice::Loading;
        self.states = Slice::Loading;
        vec![
            FetchRequest::Location,
            FetchRequest::Items,
            FetchRequest::States,
        ]
    }

    /// Re-issues every fetch whose slice ended in failure.
    pub fn retry_failed(&mut self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();
        if self.location.error().is_some() {
            self.location = Slice::Loading;
            requests.push(FetchRequest::Location);
        }
        if self.items.error().is_some() {
            self.items = Slice::Loading;
            requests.push(FetchRequest::Items);
        }
        if self.states.error().is_some() {
            self.states = Slice::Loading;
            requests.push(FetchRequest::States);
        }
        if self.cities.error().is_some() {
            if let Some(request) = self.request_cities() {
                requests.push(request);
            }
        }
        requests
    }

    pub fn apply(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Location(result) => self.apply_location(result),
            FetchOutcome::Items(result) => self.apply_items(result),
            FetchOutcome::States(result) => self.apply_states(result),
            FetchOutcome::Cities { generation, result } => {
                self.apply_cities(generation, result);
            }
        }
    }

    /// The initial position is set once; later reads are ignored.
    pub fn apply_location(&mut self, result: Result<Coordinates, FormError>) {
        if self.location.ready().is_some() {
            return;
        }
        self.location = Slice::from_result(result);
    }

    pub fn apply_items(&mut self, result: Result<Vec<CollectItem>, FormError>) {
        if let Ok(items) = &result {
            self.selected_items
                .retain(|id| items.iter().any(|item| item.id == *id));
        }
        self.items = Slice::from_result(result);
    }

    pub fn apply_states(&mut self, result: Result<Vec<GeoState>, FormError>) {
        self.states = Slice::from_result(result);
    }

    /// Selects a state (or the placeholder with `None`). A change clears the
    /// city list and the selected city and returns the fetch for the new
    /// state's cities.
    pub fn select_state(&mut self, state: Option<String>) -> Option<FetchRequest> {
        let state = normalize_choice(state);
        if state == self.selected_state {
            return None;
        }

        self.mark_edited();
        self.selected_state = state;
        self.selected_city = None;
        self.request_cities()
    }

    fn request_cities(&mut self) -> Option<FetchRequest> {
        self.city_generation += 1;
        match &self.selected_state {
            Some(state) => {
                self.cities = Slice::Loading;
                Some(FetchRequest::Cities {
                    state: state.clone(),
                    generation: self.city_generation,
                })
            }
            None => {
                self.cities = Slice::Idle;
                None
            }
        }
    }

    /// Applies a city list if it answers the latest request. Returns whether
    /// the result was used.
    pub fn apply_cities(&mut self, generation: u64, result: Result<Vec<City>, FormError>) -> bool {
        if generation != self.city_generation || self.selected_state.is_none() {
            debug!(
                generation,
                current = self.city_generation,
                "discarding stale city list"
            );
            return false;
        }

        if let Ok(cities) = &result {
            let still_listed = self
                .selected_city
                .as_ref()
                .is_none_or(|city| cities.contains(city));
            if !still_listed {
                self.selected_city = None;
            }
        }
        self.cities = Slice::from_result(result);
        true
    }

    pub fn select_city(&mut self, city: Option<String>) {
        self.mark_edited();
        self.selected_city = normalize_choice(city);
    }

    /// Adds the id if absent, removes it if present. Returns whether the id is
    /// selected afterwards.
    pub fn toggle_item(&mut self, id: ItemId) -> bool {
        self.mark_edited();
        if self.selected_items.remove(&id) {
            false
        } else {
            self.selected_items.insert(id);
            true
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.mark_edited();
        self.data.set(field, value);
    }

    pub fn set_map_position(&mut self, position: Coordinates) {
        self.mark_edited();
        self.selected_position = position;
    }

    fn mark_edited(&mut self) {
        if matches!(self.phase, FormPhase::Idle | FormPhase::Failed(_)) {
            self.phase = FormPhase::Editing;
        }
    }

    /// Assembles the payload from current state and enters `Submitting`.
    /// Nothing is validated; only one submission may be in flight.
    pub fn begin_submit(&mut self) -> Result<CreatePointRequest, SubmitRejected> {
        match self.phase {
            FormPhase::Submitting => return Err(SubmitRejected::InFlight),
            FormPhase::Submitted => return Err(SubmitRejected::AlreadySubmitted),
            _ => {}
        }

        self.phase = FormPhase::Submitting;
        Ok(self.payload())
    }

    pub fn finish_submit(&mut self, result: Result<(), FormError>) {
        if self.phase != FormPhase::Submitting {
            return;
        }
        self.phase = match result {
            Ok(()) => FormPhase::Submitted,
            Err(err) => FormPhase::Failed(err),
        };
    }

    /// An unselected state or city is sent as an empty string.
    pub fn payload(&self) -> CreatePointRequest {
        CreatePointRequest {
            name: self.data.name.clone(),
            email: self.data.email.clone(),
            whatsapp: self.data.whatsapp.clone(),
            state: self.selected_state.clone().unwrap_or_default(),
            city: self.selected_city.clone().unwrap_or_default(),
            latitude: self.selected_position.latitude,
            longitude: self.selected_position.longitude,
            collect_items: self.selected_items.iter().copied().collect(),
        }
    }

    pub fn initial_center(&self) -> Coordinates {
        self.location
            .ready()
            .copied()
            .unwrap_or(self.fallback_position)
    }

    pub fn is_submittable(&self) -> bool {
        !matches!(self.phase, FormPhase::Submitting | FormPhase::Submitted)
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn location(&self) -> &Slice<Coordinates> {
        &self.location
    }

    pub fn items(&self) -> &Slice<Vec<CollectItem>> {
        &self.items
    }

    pub fn states(&self) -> &Slice<Vec<GeoState>> {
        &self.states
    }

    pub fn cities(&self) -> &Slice<Vec<City>> {
        &self.cities
    }

    pub fn selected_state(&self) -> Option<&str> {
        self.selected_state.as_deref()
    }

    pub fn selected_city(&self) -> Option<&str> {
        self.selected_city.as_deref()
    }

    pub fn selected_items(&self) -> &BTreeSet<ItemId> {
        &self.selected_items
    }

    pub fn is_item_selected(&self, id: ItemId) -> bool {
        self.selected_items.contains(&id)
    }

    pub fn selected_position(&self) -> Coordinates {
        self.selected_position
    }

    /// Items the user can pick from; empty until the catalog loads.
    pub fn selectable_items(&self) -> &[CollectItem] {
        self.items.ready().map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
