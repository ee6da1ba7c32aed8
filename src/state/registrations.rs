//! Registration Queue: team applications awaiting an admin decision.

use crate::dao::models::{
    ActivityKind, EntityId, RegistrationEntity, RegistrationStatusEntity, TeamStats,
};
use crate::state::{
    league::{ADMIN_ACTOR, League, LeagueError, now_rfc3339, optional, required},
    standings::Team,
};

/// Input accepted by [`League::submit_registration`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub team: String,
    pub owner: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Everything needed to undo an approval.
#[derive(Debug, Clone)]
pub struct Approval {
    /// Team added to the standings.
    pub team: Team,
    /// Registration removed from the queue.
    pub registration: RegistrationEntity,
    /// Position the registration held in the queue.
    pub position: usize,
    activity_id: EntityId,
}

impl League {
    fn registration_index(&self, id: EntityId) -> Result<usize, LeagueError> {
        self.registrations
            .iter()
            .position(|registration| registration.id == id)
            .ok_or_else(|| LeagueError::not_found("registration", id))
    }

    /// Queue a public application.
    pub fn submit_registration(
        &mut self,
        registration: NewRegistration,
    ) -> Result<RegistrationEntity, LeagueError> {
        let team = required(&registration.team, "team name")?;
        let owner = required(&registration.owner, "team owner")?;
        if self.name_taken(&team) {
            return Err(LeagueError::validation(format!(
                "team name `{team}` is already taken"
            )));
        }

        let entry = RegistrationEntity {
            id: self.next_id(),
            team,
            owner,
            email: optional(registration.email),
            phone: optional(registration.phone),
            date: now_rfc3339(),
            status: RegistrationStatusEntity::Pending,
        };
        self.registrations.push(entry.clone());

        let message = format!("Registration received: {}", entry.team);
        let owner = entry.owner.clone();
        self.record(ActivityKind::Registration, message, &owner);
        Ok(entry)
    }

    /// Turn a pending registration into a standings entry.
    pub fn approve_registration(&mut self, id: EntityId) -> Result<Approval, LeagueError> {
        let position = self.registration_index(id)?;
        let candidate = &self.registrations[position];
        if self.team_index(&candidate.team).is_some() {
            return Err(LeagueError::validation(format!(
                "team `{}` already exists",
                candidate.team.trim()
            )));
        }

        let registration = self.registrations.remove(position);
        let team = Team {
            name: registration.team.trim().to_string(),
            owner: registration.owner.trim().to_string(),
            stats: TeamStats::default(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
        };
        self.teams.push(team.clone());

        let activity_id = self.record(
            ActivityKind::Registration,
            format!("Registration approved: {}", team.name),
            ADMIN_ACTOR,
        );

        Ok(Approval {
            team,
            registration,
            position,
            activity_id,
        })
    }

    /// Undo [`League::approve_registration`] after its save failed.
    pub fn revert_approval(&mut self, approval: Approval) {
        if let Some(index) = self
            .teams
            .iter()
            .rposition(|team| team.name == approval.team.name)
        {
            self.teams.remove(index);
        }

        let position = approval.position.min(self.registrations.len());
        self.registrations.insert(position, approval.registration);
        self.forget_activity(approval.activity_id);
    }

    /// Drop a pending registration.
    pub fn reject_registration(&mut self, id: EntityId) -> Result<RegistrationEntity, LeagueError> {
        let index = self.registration_index(id)?;
        let registration = self.registrations.remove(index);
        self.record(
            ActivityKind::Registration,
            format!("Registration rejected: {}", registration.team),
            ADMIN_ACTOR,
        );
        Ok(registration)
    }
}
