//! ACL engine
//!
//! Ties the role graph, membership lifecycle, grant storage and row filter
//! together behind one scoped handle.
//!
//! # Architecture
//!
//! ```text
//! allow / disallow ──────────────► GrantStore (inline | normalized)
//! can ──► SubjectCorrelator ──► Memberships ──► RoleGraph
//!   └───────────────────────────► GrantStore ──► algebra::permits
//! apply_row_filter ──► CurrentSubjects ──► build_row_predicate ──► filter AND
//! ```
//!
//! Grant writes are read-modify-write without a version check. Concurrent
//! `allow`/`disallow` calls on the same entity race and the last write wins.

pub mod config;
pub mod metrics;
pub mod subjects;


pub use config::{AclConfig, DEFAULT_ADMIN, DEFAULT_PROPERTY};
pub use metrics::{AclMetrics, MetricsCollector};
pub use subjects::{CurrentSubjects, CurrentUser, MembershipCorrelator, SubjectCorrelator};

use crate::error::{AclError, Result};
use crate::grants::{
    algebra, Entities, EntityRef, GrantHolder, GrantStore, InlineGrantStore, NormalizedGrantStore, Permission,
    RemovedGrants, Revocation,
};
use crate::membership::{Membership, MembershipState, Memberships};
use crate::roles::{Role, RoleData, RoleGraph, RoleQuery, RoleRef, RoleSelector};
use crate::scope::{resolve_scope, ScopeArg, ScopeFilter};
use crate::secure::{build_row_predicate, FilterOutcome, ModelHandle, Predicate, QueryContext, QueryOperation, QueryOptions, SecuredModel};
use crate::store::{AclStore, EntityStore, MembershipStore, RecordStore, RoleStore};
use crate::types::{Actions, BulkResult, Record, RoleId, Selection, SubjectId, Subjects, UserId};

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Collaborators shared by every scoped view of one engine
#[derive(Clone)]
struct Collaborators {
    roles: Arc<dyn RoleStore>,
    memberships: Arc<dyn MembershipStore>,
    entities: Arc<dyn EntityStore>,
    records: Arc<dyn RecordStore>,
    grants: Arc<dyn GrantStore>,
    correlator: Option<Arc<dyn SubjectCorrelator>>,
    current_subjects: Option<Arc<dyn CurrentSubjects>>,
}

/// Builder for [`Acl`]
#[derive(Default)]
pub struct AclBuilder {
    config: AclConfig,
    roles: Option<Arc<dyn RoleStore>>,
    memberships: Option<Arc<dyn MembershipStore>>,
    entities: Option<Arc<dyn EntityStore>>,
    records: Option<Arc<dyn RecordStore>>,
    correlator: Option<Arc<dyn SubjectCorrelator>>,
    current_subjects: Option<Arc<dyn CurrentSubjects>>,
}

impl AclBuilder {
    /// Use a configuration
    pub fn with_config(mut self, config: AclConfig) -> Self {
        self.config = config;
        self
    }

    /// Use one collaborator for every store concern
    pub fn with_store<S: AclStore + 'static>(mut self, store: Arc<S>) -> Self {
        self.roles = Some(store.clone());
        self.memberships = Some(store.clone());
        self.entities = Some(store.clone());
        self.records = Some(store);
        self
    }

    /// Use a dedicated role store
    pub fn with_role_store(mut self, store: Arc<dyn RoleStore>) -> Self {
        self.roles = Some(store);
        self
    }

    /// Use a dedicated membership store
    pub fn with_membership_store(mut self, store: Arc<dyn MembershipStore>) -> Self {
        self.memberships = Some(store);
        self
    }

    /// Use a dedicated store for separately kept grant lists
    pub fn with_entity_store(mut self, store: Arc<dyn EntityStore>) -> Self {
        self.entities = Some(store);
        self
    }

    /// Use a dedicated host record store
    pub fn with_record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.records = Some(store);
        self
    }

    /// Replace the default membership-based subject correlator
    pub fn with_correlator(mut self, correlator: Arc<dyn SubjectCorrelator>) -> Self {
        self.correlator = Some(correlator);
        self
    }

    /// Replace the default current-subject provider
    pub fn with_current_subjects(mut self, provider: Arc<dyn CurrentSubjects>) -> Self {
        self.current_subjects = Some(provider);
        self
    }

    /// Validate the collaborators and build the engine
    ///
    /// # Errors
    ///
    /// `UnsupportedStore` when a store concern is missing or the record
    /// store's connector is not recognized; `InvalidScope` for a bad scope.
    pub fn build(self) -> Result<Acl> {
        let missing = |what: &str| AclError::UnsupportedStore(format!("no {} store configured", what));
        let roles = self.roles.ok_or_else(|| missing("role"))?;
        let memberships = self.memberships.ok_or_else(|| missing("membership"))?;
        let entities = self.entities.ok_or_else(|| missing("entity"))?;
        let records = self.records.ok_or_else(|| missing("record"))?;

        if !self.config.connectors.iter().any(|c| c == records.connector()) {
            return Err(AclError::UnsupportedStore(format!(
                "Unsupported connector: {}",
                records.connector()
            )));
        }

        let scope = resolve_scope(&ScopeArg::from(self.config.scope.as_deref()))?;

        let grants: Arc<dyn GrantStore> = if self.config.dirty {
            Arc::new(InlineGrantStore::new(
                records.clone(),
                entities.clone(),
                self.config.property.clone(),
            ))
        } else {
            Arc::new(NormalizedGrantStore::new(entities.clone()))
        };

        info!(
            scope = %scope,
            grants = grants.mode(),
            connector = records.connector(),
            "ACL engine initialized"
        );

        let collaborators = Collaborators {
            roles,
            memberships,
            entities,
            records,
            grants,
            correlator: self.correlator,
            current_subjects: self.current_subjects,
        };

        Ok(Acl::assemble(
            Arc::new(self.config),
            collaborators,
            Arc::new(DashMap::new()),
            MetricsCollector::new(),
            scope,
        ))
    }
}

/// Scoped RBAC + per-entity ACL engine
#[derive(Clone)]
pub struct Acl {
    config: Arc<AclConfig>,
    collaborators: Collaborators,
    scope: ScopeFilter,
    roles: RoleGraph,
    memberships: Memberships,
    correlator: Arc<dyn SubjectCorrelator>,
    current_subjects: Arc<dyn CurrentSubjects>,
    secured: Arc<DashMap<String, SecuredModel>>,
    metrics: MetricsCollector,
}

impl Acl {
    /// Start building an engine
    pub fn builder() -> AclBuilder {
        AclBuilder::default()
    }

    fn assemble(
        config: Arc<AclConfig>,
        collaborators: Collaborators,
        secured: Arc<DashMap<String, SecuredModel>>,
        metrics: MetricsCollector,
        scope: ScopeFilter,
    ) -> Self {
        let roles = RoleGraph::new(
            collaborators.roles.clone(),
            collaborators.memberships.clone(),
            scope.clone(),
        );
        let memberships = Memberships::new(roles.clone(), collaborators.memberships.clone());

        let correlator: Arc<dyn SubjectCorrelator> = match &collaborators.correlator {
            Some(correlator) => correlator.clone(),
            None => Arc::new(MembershipCorrelator::new(memberships.clone())),
        };
        let current_subjects: Arc<dyn CurrentSubjects> = match &collaborators.current_subjects {
            Some(provider) => provider.clone(),
            None => Arc::new(CurrentUser::new(correlator.clone())),
        };

        Self {
            config,
            collaborators,
            scope,
            roles,
            memberships,
            correlator,
            current_subjects,
            secured,
            metrics,
        }
    }

    /// A view of this engine bound to another scope
    ///
    /// The view shares stores, secured models and metrics with this engine.
    pub fn scoped(&self, scope: impl Into<ScopeArg>) -> Result<Acl> {
        let scope = resolve_scope(&scope.into())?;
        debug!(scope = %scope, "Created scoped ACL view");
        Ok(Self::assemble(
            self.config.clone(),
            self.collaborators.clone(),
            self.secured.clone(),
            self.metrics.clone(),
            scope,
        ))
    }

    /// A view bound to several identifiers joined with `:`
    pub fn scoped_parts<I, S>(&self, parts: I) -> Result<Acl>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scoped(ScopeArg::Parts(parts.into_iter().map(Into::into).collect()))
    }

    /// Scope filter of this view
    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// Whether lookups are filtered by scope (false for the `"*"` view)
    pub fn is_scoped(&self) -> bool {
        !self.scope.is_all()
    }

    /// Engine configuration
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// Role graph of this view
    pub fn roles(&self) -> &RoleGraph {
        &self.roles
    }

    /// Membership manager of this view
    pub fn memberships(&self) -> &Memberships {
        &self.memberships
    }

    /// Metrics shared by every view
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Find or create a role in this view's scope
    pub async fn add_role(&self, data: impl Into<RoleData>) -> Result<Role> {
        self.roles.add_role(data).await
    }

    /// Find roles
    pub async fn find_roles(&self, query: RoleQuery) -> Result<Vec<Role>> {
        self.roles.find_roles(query).await
    }

    /// Count roles
    pub async fn count_roles(&self, query: RoleQuery) -> Result<usize> {
        self.roles.count_roles(query).await
    }

    /// Remove roles and their memberships
    pub async fn remove_roles(&self, selector: impl Into<RoleSelector>) -> Result<usize> {
        self.roles.remove_roles(selector).await
    }

    /// Add parents to a role addressed by object or id
    pub async fn inherit_role_from<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.roles.inherit(role, parents).await
    }

    /// Remove parents from a role addressed by object or id
    pub async fn uninherit_role_from<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.roles.uninherit(role, parents).await
    }

    /// Replace the parents of a role addressed by object or id
    pub async fn set_role_inherits<I, R>(&self, role: impl Into<RoleRef>, parents: I) -> Result<Role>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.roles.set_inherits(role, parents).await
    }

    /// Ids of every ancestor of the roles
    pub async fn recurse_parent_role_ids<I, R>(&self, roles: I) -> Result<Vec<RoleId>>
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleRef>,
    {
        self.roles.recurse_parent_role_ids(roles).await
    }

    // ------------------------------------------------------------------
    // Memberships
    // ------------------------------------------------------------------

    /// Assign roles to users
    pub async fn assign_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
        state: Option<MembershipState>,
    ) -> Result<BulkResult<Membership>> {
        self.memberships.assign_memberships(users, roles, state).await
    }

    /// Assign the first resolved role to a user
    pub async fn assign_membership(
        &self,
        user: impl Into<UserId>,
        role: impl Into<RoleRef>,
        state: Option<MembershipState>,
    ) -> Result<Option<Membership>> {
        self.memberships.assign_membership(user, role, state).await
    }

    /// Remove memberships
    pub async fn unassign_memberships(
        &self,
        users: impl Into<Selection<UserId>>,
        roles: impl Into<Selection<RoleRef>>,
    ) -> Result<usize> {
        self.memberships.unassign_memberships(users, roles).await
    }

    /// Activate memberships
    pub async fn approve_membership(
        &self,
        user: impl Into<Selection<UserId>>,
        role: impl Into<Selection<RoleRef>>,
    ) -> Result<BulkResult<Membership>> {
        self.memberships.approve_membership(user, role).await
    }

    /// Roles held through active memberships
    pub async fn find_user_roles(&self, user: impl Into<Selection<UserId>>, recursive: bool) -> Result<Vec<Role>> {
        self.memberships.find_user_roles(user, recursive).await
    }

    /// Users holding any of the roles
    pub async fn find_role_users(&self, roles: impl Into<Selection<RoleRef>>) -> Result<Vec<UserId>> {
        self.memberships.find_role_users(roles).await
    }

    /// Whether a user holds all of the roles
    pub async fn has_roles(&self, user: impl Into<UserId>, roles: impl Into<Selection<RoleRef>>) -> Result<bool> {
        self.memberships.has_roles(user, roles).await
    }

    // ------------------------------------------------------------------
    // Grants
    // ------------------------------------------------------------------

    fn require_subjects(subjects: Subjects) -> Result<Vec<SubjectId>> {
        let subjects = subjects.normalize()?;
        if subjects.is_empty() {
            return Err(AclError::InvalidArgument("at least one subject is required".to_string()));
        }
        Ok(subjects)
    }

    fn require_entities(entities: Entities) -> Result<Vec<EntityRef>> {
        let entities = entities.normalize()?;
        if entities.is_empty() {
            return Err(AclError::InvalidArgument("at least one entity is required".to_string()));
        }
        Ok(entities)
    }

    /// Grant `actions` on every entity to every subject
    ///
    /// Arguments are validated before any write. Returns the written
    /// holders: the host record in inline mode, the keyed list otherwise.
    pub async fn allow(
        &self,
        subjects: impl Into<Subjects>,
        entities: impl Into<Entities>,
        actions: impl Into<Actions>,
    ) -> Result<Vec<GrantHolder>> {
        let subjects = Self::require_subjects(subjects.into())?;
        let entities = Self::require_entities(entities.into())?;
        let actions = actions.into().normalize()?;
        if actions.is_empty() {
            return Err(AclError::InvalidArgument("at least one action is required".to_string()));
        }

        let grants = &self.collaborators.grants;
        let mut written = Vec::with_capacity(entities.len());
        for entity in &entities {
            let Some(holder) = grants.holder(entity, true).await? else {
                continue;
            };
            let current = grants.permissions(&holder)?;
            let next = algebra::grant(current, &subjects, &actions);
            written.push(grants.write(holder, Some(next)).await?);
        }

        info!(subjects = ?subjects, actions = ?actions, entities = written.len(), "Allowed");
        Ok(written)
    }

    /// Revoke `actions` (every action for `"*"`, `"ALL"` or `None`)
    ///
    /// A subject left without actions loses its grant; an entity left
    /// without grants becomes unrestricted again.
    pub async fn disallow(
        &self,
        subjects: impl Into<Subjects>,
        entities: impl Into<Entities>,
        actions: impl Into<Revocation>,
    ) -> Result<Vec<GrantHolder>> {
        let subjects = Self::require_subjects(subjects.into())?;
        let entities = Self::require_entities(entities.into())?;
        let revoked = actions.into().normalize()?;
        let revoked = revoked.filter(|actions| !actions.is_empty());

        let grants = &self.collaborators.grants;
        let mut written = Vec::with_capacity(entities.len());
        for entity in &entities {
            let Some(holder) = grants.holder(entity, false).await? else {
                continue;
            };
            let current = grants.permissions(&holder)?;
            if current.is_none() {
                continue;
            }
            let next = algebra::revoke(current, &subjects, revoked.as_deref());
            written.push(grants.write(holder, next).await?);
        }

        info!(subjects = ?subjects, actions = ?revoked, entities = written.len(), "Disallowed");
        Ok(written)
    }

    /// Whether any of the subjects, or a subject correlated with them, holds
    /// every action on the entity
    ///
    /// An entity without grants allows everyone.
    pub async fn can(
        &self,
        subjects: impl Into<Subjects>,
        entity: impl Into<EntityRef>,
        actions: impl Into<Actions>,
    ) -> Result<bool> {
        let start = Instant::now();
        let subjects = subjects.into().normalize()?;
        let actions = actions.into().normalize()?;
        let entity = entity.into();
        entity.validate()?;

        let allowed = self.decide(subjects, &entity, &actions).await;
        match &allowed {
            Ok(allowed) => {
                self.metrics.record_decision(*allowed, start.elapsed()).await;
                debug!(entity = %entity.key(), actions = ?actions, allowed, "Permission check");
            }
            Err(e) => {
                self.metrics.record_error().await;
                warn!(entity = %entity.key(), error = %e, "Permission check failed");
            }
        }
        allowed
    }

    async fn decide(&self, subjects: Vec<SubjectId>, entity: &EntityRef, actions: &[String]) -> Result<bool> {
        if subjects.is_empty() {
            return Ok(false);
        }
        if actions.is_empty() {
            return Ok(true);
        }

        let grants = &self.collaborators.grants;
        let Some(holder) = grants.holder(entity, false).await? else {
            return Ok(true);
        };
        let permissions = match grants.permissions(&holder)? {
            Some(list) if !list.is_empty() => list,
            _ => return Ok(true),
        };

        let mut correlated = subjects.clone();
        for subject in &subjects {
            for related in self.correlator.correlate(subject).await? {
                if !correlated.contains(&related) {
                    correlated.push(related);
                }
            }
        }

        Ok(algebra::permits(Some(&permissions), &correlated, actions))
    }

    /// Negation of [`can`](Self::can)
    pub async fn cannot(
        &self,
        subjects: impl Into<Subjects>,
        entity: impl Into<EntityRef>,
        actions: impl Into<Actions>,
    ) -> Result<bool> {
        Ok(!self.can(subjects, entity, actions).await?)
    }

    /// Same as [`can`](Self::can)
    pub async fn has_permission(
        &self,
        subjects: impl Into<Subjects>,
        entity: impl Into<EntityRef>,
        actions: impl Into<Actions>,
    ) -> Result<bool> {
        self.can(subjects, entity, actions).await
    }

    /// Current grant list of an entity; `None` is unrestricted
    pub async fn grants(&self, entity: impl Into<EntityRef>) -> Result<Option<Vec<Permission>>> {
        let entity = entity.into();
        entity.validate()?;
        let grants = &self.collaborators.grants;
        match grants.holder(&entity, false).await? {
            Some(holder) => grants.permissions(&holder),
            None => Ok(None),
        }
    }

    /// Drop the grant lists of the entities, one entity at a time
    pub async fn remove_entities_permissions(&self, entities: impl Into<Entities>) -> Result<Vec<RemovedGrants>> {
        let entities = Self::require_entities(entities.into())?;
        let mut removed = Vec::with_capacity(entities.len());
        for entity in &entities {
            removed.push(self.collaborators.grants.clear(entity).await?);
        }
        info!(entities = removed.len(), "Removed entity permissions");
        Ok(removed)
    }

    /// Strip every grant held by the subjects across the models
    ///
    /// Defaults to every secured model. Each holder is written independently
    /// and failures are reported per holder.
    pub async fn remove_subjects_permissions(
        &self,
        subjects: impl Into<Subjects>,
        models: Option<Vec<String>>,
    ) -> Result<BulkResult<GrantHolder>> {
        let subjects = subjects.into().normalize()?;
        let mut outcome = BulkResult::default();
        if subjects.is_empty() {
            return Ok(outcome);
        }

        let models = models.unwrap_or_else(|| self.secured.iter().map(|e| e.key().clone()).collect());
        let grants = &self.collaborators.grants;

        for model in &models {
            for holder in grants.holders_of_type(model).await? {
                let current = match grants.permissions(&holder) {
                    Ok(current) => current,
                    Err(e) => {
                        outcome.push(holder_key(&holder), Err(e));
                        continue;
                    }
                };
                let held = current
                    .as_ref()
                    .map_or(false, |list| list.iter().any(|p| subjects.contains(&p.subject)));
                if !held {
                    continue;
                }

                let key = holder_key(&holder);
                let next = algebra::forget(current, &subjects);
                outcome.push(key, grants.write(holder, next).await);
            }
        }

        info!(
            subjects = ?subjects,
            models = ?models,
            updated = outcome.items.len(),
            failed = outcome.failures.len(),
            "Removed subject permissions"
        );
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Row filtering
    // ------------------------------------------------------------------

    /// Register a model for row filtering
    ///
    /// Securing an already secured model is a no-op.
    ///
    /// # Errors
    ///
    /// `UnsupportedStore` for an unrecognized connector or normalized grant
    /// storage; `DuplicatePropertyDefinition` when the model already declares
    /// the inline grant property.
    pub fn secure(&self, model: ModelHandle) -> Result<SecuredModel> {
        let connector = model
            .connector
            .clone()
            .unwrap_or_else(|| self.collaborators.records.connector().to_string());
        if !self.config.connectors.iter().any(|c| c == &connector) {
            return Err(AclError::UnsupportedStore(format!("Unsupported connector: {}", connector)));
        }
        if !self.config.dirty {
            return Err(AclError::UnsupportedStore(format!(
                "row filtering of {} requires inline grant storage",
                model.name
            )));
        }

        if let Some(existing) = self.secured.get(&model.name) {
            return Ok(existing.value().clone());
        }

        if model.properties.iter().any(|p| p == &self.config.property) {
            return Err(AclError::DuplicatePropertyDefinition {
                property: self.config.property.clone(),
                model: model.name,
            });
        }

        let secured = SecuredModel {
            name: model.name.clone(),
            connector,
            property: self.config.property.clone(),
        };
        self.secured.insert(model.name, secured.clone());
        info!(model = %secured.name, connector = %secured.connector, "Secured model");
        Ok(secured)
    }

    /// Stop filtering a model; returns whether it was secured
    pub fn unsecure(&self, model: &str) -> bool {
        let removed = self.secured.remove(model).is_some();
        if removed {
            info!(model, "Unsecured model");
        }
        removed
    }

    /// Whether a model is secured
    pub fn is_secured(&self, model: &str) -> bool {
        self.secured.contains_key(model)
    }

    /// Every secured model
    pub fn secured_models(&self) -> Vec<SecuredModel> {
        let mut models: Vec<SecuredModel> = self.secured.iter().map(|e| e.value().clone()).collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        models
    }

    /// AND the read predicate onto an intercepted query
    ///
    /// Bypasses, in order: unsecured model, non-read operation, `secure:
    /// false` or `skip_secure`, single-id lookup without `secure: true`,
    /// admin among the current subjects.
    pub async fn apply_row_filter(&self, query: &mut QueryContext) -> Result<FilterOutcome> {
        let outcome = self.row_filter(query).await?;
        self.metrics.record_filter(outcome).await;
        if outcome.is_applied() {
            debug!(model = %query.model, operation = ?query.operation, "Row filter applied");
        } else {
            debug!(model = %query.model, operation = ?query.operation, reason = %outcome, "Row filter skipped");
        }
        Ok(outcome)
    }

    async fn row_filter(&self, query: &mut QueryContext) -> Result<FilterOutcome> {
        let Some(model) = self.secured.get(&query.model).map(|e| e.value().clone()) else {
            return Ok(FilterOutcome::NotSecured);
        };
        if !query.operation.is_read() {
            return Ok(FilterOutcome::UnfilteredOperation);
        }

        let secure = query.options.secure.or(self.config.secure);
        if query.options.skip_secure || secure == Some(false) {
            return Ok(FilterOutcome::Disabled);
        }
        if secure != Some(true) && query.filter.as_ref().map_or(false, Predicate::targets_single_id) {
            return Ok(FilterOutcome::SingleRecordLookup);
        }

        let subjects = self.current_subjects.current_subjects(&query.options).await?;
        if subjects.iter().any(|s| s == &self.config.admin) {
            return Ok(FilterOutcome::Admin);
        }

        let predicate = build_row_predicate(&model.property, &subjects, &self.config.normalized_read_actions());
        query.filter = Some(match query.filter.take() {
            Some(filter) => filter.and(predicate),
            None => predicate,
        });
        Ok(FilterOutcome::Applied)
    }

    /// Run a list query through the row filter and the record store
    pub async fn find_records(
        &self,
        model: &str,
        filter: Option<Predicate>,
        options: QueryOptions,
    ) -> Result<Vec<Record>> {
        let mut query = QueryContext::new(model, QueryOperation::Find, options);
        query.filter = filter;
        self.apply_row_filter(&mut query).await?;
        self.collaborators
            .records
            .find_records(model, query.filter.as_ref())
            .await
    }
}

fn holder_key(holder: &GrantHolder) -> String {
    match holder {
        GrantHolder::Record(record) => format!("{}:{}", record.model, record.id),
        GrantHolder::Entity(entity) => entity.key().to_string(),
    }
}
