//! In-process stand-in for the MySQL schema: same orderings, same unique and
//! foreign-key outcomes, no database required.

use crate::{
    error::{StoreError, StoreResult},
    model::{
        attendance::Attendance,
        role::Role,
        schedule::{NewSchedule, Schedule},
        shift::{NewShift, Shift},
        user::{NewUser, User, UserChanges},
    },
    repository::{AttendanceRepository, RoleRepository, ScheduleRepository, ShiftRepository, UserRepository},
    utils::pagination::{Pagination, page_of},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone)]
struct StoredSchedule {
    id: u64,
    user_id: u64,
    shift_id: u64,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

struct State {
    next_id: u64,
    roles: BTreeMap<u64, Role>,
    users: BTreeMap<u64, User>,
    shifts: BTreeMap<u64, Shift>,
    schedules: BTreeMap<u64, StoredSchedule>,
    attendances: BTreeMap<u64, Attendance>,
}

impl State {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_user(&self, user: &User) -> User {
        let mut user = user.clone();
        user.role = self.roles.get(&user.role_id).cloned();
        user
    }

    fn resolve_schedule(&self, stored: &StoredSchedule, with_user: bool) -> Schedule {
        Schedule {
            id: stored.id,
            user_id: stored.user_id,
            shift_id: stored.shift_id,
            date: stored.date,
            created_at: stored.created_at,
            shift: self.shifts.get(&stored.shift_id).map(Shift::summary),
            user: if with_user {
                self.users.get(&stored.user_id).map(User::summary)
            } else {
                None
            },
        }
    }

    fn username_of(&self, user_id: u64) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn user_conflicts(&self, skip: Option<u64>, username: &str, email: &str) -> bool {
        self.users.values().any(|u| {
            Some(u.id) != skip
                && (u.username.eq_ignore_ascii_case(username) || u.email.eq_ignore_ascii_case(email))
        })
    }

    fn schedule_conflicts(&self, skip: Option<u64>, user_id: u64, date: NaiveDate) -> bool {
        self.schedules
            .values()
            .any(|s| Some(s.id) != skip && s.user_id == user_id && s.date == date)
    }
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Seeded with the base roles, Admin as 1 and Employee as 2.
    pub fn new() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(1, Role { id: 1, name: "Admin".into() });
        roles.insert(2, Role { id: 2, name: "Employee".into() });

        Self {
            state: Mutex::new(State {
                next_id: 100,
                roles,
                users: BTreeMap::new(),
                shifts: BTreeMap::new(),
                schedules: BTreeMap::new(),
                attendances: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> StoreResult<u64> {
        let mut state = self.lock();
        if state.user_conflicts(None, &user.username, &user.email) {
            return Err(StoreError::Duplicate);
        }
        if !state.roles.contains_key(&user.role_id) {
            return Err(StoreError::InvalidReference);
        }

        let id = state.id();
        let now = Utc::now();
        state.users.insert(
            id,
            User {
                id,
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                email: user.email.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                role_id: user.role_id,
                role: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        let state = self.lock();
        Ok(state.users.get(&id).map(|u| state.resolve_user(u)))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let state = self.lock();
        Ok(state
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .map(|u| state.resolve_user(u)))
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(UserRepository::find_by_username(self, username).await?.is_some())
    }

    async fn list(&self, pagination: Pagination) -> StoreResult<(Vec<User>, u64)> {
        let state = self.lock();
        let all: Vec<User> = state.users.values().map(|u| state.resolve_user(u)).collect();
        Ok((page_of(&all, pagination), all.len() as u64))
    }

    async fn update(&self, id: u64, changes: &UserChanges) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.users.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.user_conflicts(Some(id), &changes.username, &changes.email) {
            return Err(StoreError::Duplicate);
        }
        if !state.roles.contains_key(&changes.role_id) {
            return Err(StoreError::InvalidReference);
        }

        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.username = changes.username.clone();
        user.email = changes.email.clone();
        user.first_name = changes.first_name.clone();
        user.last_name = changes.last_name.clone();
        user.role_id = changes.role_id;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_password(&self, id: u64, password_hash: &str) -> StoreResult<()> {
        let mut state = self.lock();
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.users.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let referenced = state.schedules.values().any(|s| s.user_id == id)
            || state.attendances.values().any(|a| a.user_id == id);
        if referenced {
            return Err(StoreError::StillReferenced);
        }
        state.users.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn create(&self, name: &str) -> StoreResult<u64> {
        let mut state = self.lock();
        if state.roles.values().any(|r| r.name.eq_ignore_ascii_case(name)) {
            return Err(StoreError::Duplicate);
        }
        let id = state.id();
        state.roles.insert(id, Role { id, name: name.to_string() });
        Ok(id)
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<Role>> {
        Ok(self.lock().roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(self
            .lock()
            .roles
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Role>> {
        Ok(self.lock().roles.values().cloned().collect())
    }

    async fn update(&self, id: u64, name: &str) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.roles.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state
            .roles
            .values()
            .any(|r| r.id != id && r.name.eq_ignore_ascii_case(name))
        {
            return Err(StoreError::Duplicate);
        }
        if let Some(role) = state.roles.get_mut(&id) {
            role.name = name.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.roles.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.users.values().any(|u| u.role_id == id) {
            return Err(StoreError::StillReferenced);
        }
        state.roles.remove(&id);
        Ok(())
    }

    async fn count_users(&self, id: u64) -> StoreResult<u64> {
        Ok(self.lock().users.values().filter(|u| u.role_id == id).count() as u64)
    }
}

#[async_trait]
impl ShiftRepository for MemoryStore {
    async fn create(&self, shift: &NewShift) -> StoreResult<u64> {
        let mut state = self.lock();
        let id = state.id();
        let now = Utc::now();
        state.shifts.insert(
            id,
            Shift {
                id,
                name: shift.name.clone(),
                start_time: shift.start_time,
                end_time: shift.end_time,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<Shift>> {
        Ok(self.lock().shifts.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Shift>> {
        let mut shifts: Vec<Shift> = self.lock().shifts.values().cloned().collect();
        shifts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(shifts)
    }

    async fn update(&self, id: u64, shift: &NewShift) -> StoreResult<()> {
        let mut state = self.lock();
        let stored = state.shifts.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.name = shift.name.clone();
        stored.start_time = shift.start_time;
        stored.end_time = shift.end_time;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.shifts.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.schedules.values().any(|s| s.shift_id == id) {
            return Err(StoreError::StillReferenced);
        }
        state.shifts.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MemoryStore {
    async fn create(&self, schedule: &NewSchedule) -> StoreResult<u64> {
        let mut state = self.lock();
        if state.schedule_conflicts(None, schedule.user_id, schedule.date) {
            return Err(StoreError::Duplicate);
        }
        if !state.users.contains_key(&schedule.user_id) || !state.shifts.contains_key(&schedule.shift_id) {
            return Err(StoreError::InvalidReference);
        }

        let id = state.id();
        state.schedules.insert(
            id,
            StoredSchedule {
                id,
                user_id: schedule.user_id,
                shift_id: schedule.shift_id,
                date: schedule.date,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn find_for_user_on(&self, user_id: u64, date: NaiveDate) -> StoreResult<Option<Schedule>> {
        let state = self.lock();
        Ok(state
            .schedules
            .values()
            .find(|s| s.user_id == user_id && s.date == date)
            .map(|s| state.resolve_schedule(s, false)))
    }

    async fn list_for_user(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)> {
        let state = self.lock();
        let mut matching: Vec<Schedule> = state
            .schedules
            .values()
            .filter(|s| s.user_id == user_id && start <= s.date && s.date <= end)
            .map(|s| state.resolve_schedule(s, false))
            .collect();
        matching.sort_by_key(|s| s.date);
        Ok((page_of(&matching, pagination), matching.len() as u64))
    }

    async fn list_all(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)> {
        let state = self.lock();
        let mut matching: Vec<Schedule> = state
            .schedules
            .values()
            .filter(|s| start <= s.date && s.date <= end)
            .map(|s| state.resolve_schedule(s, true))
            .collect();
        matching.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| state.username_of(a.user_id).cmp(&state.username_of(b.user_id)))
        });
        Ok((page_of(&matching, pagination), matching.len() as u64))
    }

    async fn update(&self, id: u64, schedule: &NewSchedule) -> StoreResult<()> {
        let mut state = self.lock();
        if !state.schedules.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.schedule_conflicts(Some(id), schedule.user_id, schedule.date) {
            return Err(StoreError::Duplicate);
        }
        if !state.users.contains_key(&schedule.user_id) || !state.shifts.contains_key(&schedule.shift_id) {
            return Err(StoreError::InvalidReference);
        }

        let stored = state.schedules.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.user_id = schedule.user_id;
        stored.shift_id = schedule.shift_id;
        stored.date = schedule.date;
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        self.lock()
            .schedules
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryStore {
    async fn create(&self, user_id: u64, check_in_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<u64> {
        let mut state = self.lock();
        if !state.users.contains_key(&user_id) {
            return Err(StoreError::InvalidReference);
        }
        let id = state.id();
        state.attendances.insert(
            id,
            Attendance {
                id,
                user_id,
                check_in_at,
                check_out_at: None,
                notes: notes.map(str::to_string),
                created_at: check_in_at,
                updated_at: check_in_at,
                user: None,
            },
        );
        Ok(id)
    }

    async fn last_for_user(&self, user_id: u64) -> StoreResult<Option<Attendance>> {
        Ok(self
            .lock()
            .attendances
            .values()
            .filter(|a| a.user_id == user_id)
            .max_by_key(|a| (a.check_in_at, a.id))
            .cloned())
    }

    async fn close(&self, id: u64, check_out_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<bool> {
        let mut state = self.lock();
        match state.attendances.get_mut(&id) {
            Some(att) if att.is_open() => {
                att.check_out_at = Some(check_out_at);
                if let Some(notes) = notes {
                    att.notes = Some(notes.to_string());
                }
                att.updated_at = check_out_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_user(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)> {
        let mut matching: Vec<Attendance> = self
            .lock()
            .attendances
            .values()
            .filter(|a| a.user_id == user_id && from <= a.check_in_at && a.check_in_at <= to)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.check_in_at.cmp(&a.check_in_at));
        Ok((page_of(&matching, pagination), matching.len() as u64))
    }

    async fn list_all(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)> {
        let state = self.lock();
        let mut matching: Vec<Attendance> = state
            .attendances
            .values()
            .filter(|a| from <= a.check_in_at && a.check_in_at <= to)
            .map(|a| {
                let mut att = a.clone();
                att.user = state.users.get(&a.user_id).map(User::summary);
                att
            })
            .collect();
        matching.sort_by(|a, b| {
            b.check_in_at
                .cmp(&a.check_in_at)
                .then_with(|| state.username_of(a.user_id).cmp(&state.username_of(b.user_id)))
        });
        Ok((page_of(&matching, pagination), matching.len() as u64))
    }
}

/// Inserts a user with a placeholder password hash.
pub async fn seed_user(users: &dyn UserRepository, username: &str, role_id: u64) -> u64 {
    users
        .create(&NewUser {
            username: username.to_string(),
            password_hash: String::new(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            role_id,
        })
        .await
        .unwrap()
}
