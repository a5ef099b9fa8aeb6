use crate::domain::errors::NominationError;
use crate::domain::models::{
    Decision, DraftPatch, ListFilter, NewNomination, NominationRecord, ReviewRules, Status,
};
use crate::services::storage::NominationStore;
use chrono::Utc;

type Result<T> = std::result::Result<T, NominationError>;

/// Owns the nomination lifecycle on top of an injected store.
pub struct NominationManager<S: NominationStore> {
    store: S,
    rules: ReviewRules,
}

fn required(field: &str, value: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(NominationError::Validation(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

fn same_person(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl<S: NominationStore> NominationManager<S> {
    pub fn new(store: S, rules: ReviewRules) -> Self {
        Self { store, rules }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn validate_parties(&self, nominator: &str, nominee: &str) -> Result<()> {
        if !self.rules.allow_self_nomination && same_person(nominator, nominee) {
            return Err(NominationError::Validation(format!(
                "self-nomination is not allowed ({})",
                nominator
            )));
        }
        Ok(())
    }

    pub fn create(
        &mut self,
        nominator: &str,
        nominee: &str,
        award_cycle: &str,
        justification: &str,
    ) -> Result<NominationRecord> {
        let new = NewNomination {
            nominator: required("nominator", nominator)?,
            nominee: required("nominee", nominee)?,
            award_cycle: required("award_cycle", award_cycle)?,
            justification: required("justification", justification)?,
            ..Default::default()
        };
        self.validate_parties(&new.nominator, &new.nominee)?;
        let record = self.store.insert(new)?;
        tracing::info!(id = %record.id, cycle = %record.award_cycle, "nomination created");
        self.store.audit(
            "create",
            serde_json::json!({"id": record.id, "nominator": record.nominator}),
        );
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<NominationRecord> {
        self.store.get(id)
    }

    pub fn list(&self, filter: &ListFilter) -> Result<Vec<NominationRecord>> {
        let mut out: Vec<_> = self
            .store
            .list()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    /// Nominator-only edit while the record is still a draft.
    pub fn update_draft(
        &mut self,
        id: &str,
        actor: &str,
        patch: DraftPatch,
    ) -> Result<NominationRecord> {
        let mut record = self.store.get(id)?;
        if record.status != Status::Draft {
            return Err(NominationError::state(id, record.status, "edit"));
        }
        if !same_person(actor, &record.nominator) {
            return Err(NominationError::Forbidden {
                id: id.to_string(),
                actor: actor.to_string(),
                action: "edit",
            });
        }
        if let Some(n) = patch.nominee {
            record.nominee = required("nominee", &n)?;
        }
        if let Some(c) = patch.award_cycle {
            record.award_cycle = required("award_cycle", &c)?;
        }
        if let Some(j) = patch.justification {
            record.justification = required("justification", &j)?;
        }
        self.validate_parties(&record.nominator, &record.nominee)?;
        let record = self.store.update(record)?;
        self.store.audit("edit", serde_json::json!({"id": record.id}));
        Ok(record)
    }

    pub fn submit(&mut self, id: &str) -> Result<NominationRecord> {
        let mut record = self.store.get(id)?;
        if record.status != Status::Draft {
            return Err(NominationError::state(id, record.status, "submit"));
        }
        if record.justification.trim().is_empty() {
            return Err(NominationError::Validation(
                "justification is required before submission".to_string(),
            ));
        }
        let now = Utc::now();
        let actor = record.nominator.clone();
        record.transition(Status::Submitted, now, Some(actor.as_str()));
        record.submitted_at = Some(now);
        let record = self.store.update(record)?;
        tracing::info!(id = %record.id, "nomination submitted");
        self.store.audit("submit", serde_json::json!({"id": record.id}));
        Ok(record)
    }

    fn check_reviewer(&self, record: &NominationRecord, reviewer: &str) -> Result<()> {
        let listed = self.rules.reviewers.is_empty()
            || self.rules.reviewers.iter().any(|r| same_person(r, reviewer));
        if !listed || same_person(reviewer, &record.nominee) {
            return Err(NominationError::Forbidden {
                id: record.id.clone(),
                actor: reviewer.to_string(),
                action: "review",
            });
        }
        Ok(())
    }

    /// Submitted -> Reviewed without a decision yet.
    pub fn start_review(&mut self, id: &str, reviewer: &str) -> Result<NominationRecord> {
        let mut record = self.store.get(id)?;
        if record.status != Status::Submitted {
            return Err(NominationError::state(id, record.status, "start review"));
        }
        self.check_reviewer(&record, reviewer)?;
        record.transition(Status::Reviewed, Utc::now(), Some(reviewer));
        record.reviewer = Some(reviewer.to_string());
        let record = self.store.update(record)?;
        self.store.audit(
            "start_review",
            serde_json::json!({"id": record.id, "reviewer": reviewer}),
        );
        Ok(record)
    }

    pub fn review(&mut self, id: &str, decision: Decision) -> Result<NominationRecord> {
        self.decide(id, decision, None)
    }

    pub fn review_as(
        &mut self,
        id: &str,
        decision: Decision,
        reviewer: &str,
    ) -> Result<NominationRecord> {
        self.decide(id, decision, Some(reviewer))
    }

    fn decide(
        &mut self,
        id: &str,
        decision: Decision,
        reviewer: Option<&str>,
    ) -> Result<NominationRecord> {
        let mut record = self.store.get(id)?;
        if !matches!(record.status, Status::Submitted | Status::Reviewed) {
            return Err(NominationError::state(id, record.status, "review"));
        }
        if let Some(r) = reviewer {
            self.check_reviewer(&record, r)?;
            record.reviewer = Some(r.to_string());
        }
        let now = Utc::now();
        if record.status == Status::Submitted && !self.rules.single_step {
            record.transition(Status::Reviewed, now, reviewer);
        }
        record.transition(decision.into(), now, reviewer);
        let record = self.store.update(record)?;
        tracing::info!(id = %record.id, status = %record.status, "nomination decided");
        self.store.audit(
            "review",
            serde_json::json!({"id": record.id, "decision": decision, "reviewer": reviewer}),
        );
        Ok(record)
    }

    pub fn vote(&mut self, id: &str) -> Result<NominationRecord> {
        let mut record = self.store.get(id)?;
        if !matches!(record.status, Status::Submitted | Status::Reviewed) {
            return Err(NominationError::state(id, record.status, "vote"));
        }
        record.votes += 1;
        let record = self.store.update(record)?;
        self.store.audit(
            "vote",
            serde_json::json!({"id": record.id, "votes": record.votes}),
        );
        Ok(record)
    }
}
