/*
 * Copyright 2025 Cory Parent
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Resource pool: membership tracking, pattern matching, and allocation
//!
//! The pool maps robot URIs to [`Resource`] records, reconciles membership
//! against the conductor's client roster, and answers the scheduler's
//! allocation requests. Matching is deterministic: match sets iterate in
//! lexicographic URI order, so allocation outcomes are reproducible.

use crate::error::{SchedulerError, SchedulerResult};
use concerto_core::{
    anchor_pattern, timestamp_now, ClientInfo, PoolSnapshot, RequestHandle, RequestId,
    ResourceRecord, ResourceSpec, ResourceStatus, MAX_PERMUTATION_ITEMS,
};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};

fn compile_pattern(pattern: &str) -> SchedulerResult<Regex> {
    Regex::new(&anchor_pattern(pattern)).map_err(|err| {
        SchedulerError::invalid_request(format!("malformed URI pattern '{pattern}': {err}"))
    })
}

/// One robot known to the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    uri: String,
    capability: String,
    status: ResourceStatus,
    owner: Option<RequestId>,
}

impl Resource {
    /// Create an available resource with no owner
    pub fn new(uri: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            capability: capability.into(),
            status: ResourceStatus::Available,
            owner: None,
        }
    }

    /// Stable robot URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Capability the robot currently advertises
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Current pool status
    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// Holding request, if any
    pub fn owner(&self) -> Option<RequestId> {
        self.owner
    }

    /// Whether this resource matches a requested item.
    ///
    /// The spec URI is applied as a regular expression anchored over the
    /// whole resource URI; the capability must be equal unless the spec
    /// leaves it empty.
    pub fn matches(&self, spec: &ResourceSpec) -> SchedulerResult<bool> {
        if !spec.capability.is_empty() && spec.capability != self.capability {
            return Ok(false);
        }
        let pattern = compile_pattern(&spec.uri)?;
        Ok(pattern.is_match(&self.uri))
    }

    /// Hand the resource to a request
    pub fn allocate(&mut self, owner: RequestId) -> SchedulerResult<()> {
        match self.status {
            ResourceStatus::Available => {
                self.status = ResourceStatus::Allocated;
                self.owner = Some(owner);
                Ok(())
            }
            status => Err(SchedulerError::InvalidAllocation {
                uri: self.uri.clone(),
                status,
            }),
        }
    }

    /// Return the resource to the pool; returns whether anything changed.
    ///
    /// With an `owner` given, the release is a no-op unless it matches the
    /// recorded owner. Releasing a missing resource marks it gone: it cannot
    /// become available while unreachable, and the next roster
    /// reconciliation sweeps it.
    pub fn release(&mut self, owner: Option<RequestId>) -> bool {
        if owner.is_some() && owner != self.owner {
            return false;
        }
        match self.status {
            ResourceStatus::Allocated => {
                self.status = ResourceStatus::Available;
                self.owner = None;
                true
            }
            ResourceStatus::Missing if self.owner.is_some() => {
                self.status = ResourceStatus::Gone;
                self.owner = None;
                true
            }
            _ => false,
        }
    }

    /// Force a status; returns whether anything changed.
    ///
    /// `Gone` drops any owner. `Missing` preserves it so a later release
    /// still finds the holding request. `Available` clears the owner;
    /// `Allocated` keeps whatever owner is recorded.
    pub fn update_status(&mut self, status: ResourceStatus) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        match status {
            ResourceStatus::Gone | ResourceStatus::Available => self.owner = None,
            ResourceStatus::Missing | ResourceStatus::Allocated => {}
        }
        true
    }
}

/// All robots known to this scheduler, indexed by URI
#[derive(Debug, Default)]
pub struct ResourcePool {
    resources: HashMap<String, Resource>,
    changed: bool,
}

impl ResourcePool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether membership or status changed since the flag was last cleared
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Reset the change latch after publishing a snapshot
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Number of pooled resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up one resource by URI
    pub fn get(&self, uri: &str) -> Option<&Resource> {
        self.resources.get(uri)
    }

    /// Snapshot of every resource for external publication, sorted by URI
    pub fn known_resources(&self) -> PoolSnapshot {
        let mut records: Vec<ResourceRecord> = self
            .resources
            .values()
            .map(|res| ResourceRecord {
                uri: res.uri.clone(),
                capability: res.capability.clone(),
                status: res.status,
                owner: res.owner,
            })
            .collect();
        records.sort_by(|a, b| a.uri.cmp(&b.uri));
        PoolSnapshot {
            resources: records,
            taken_at: timestamp_now(),
        }
    }

    /// Reconcile pool membership against the conductor's roster.
    ///
    /// Offline roster entries count as absent. New clients enter available;
    /// clients that vanished holding an allocation become missing with their
    /// owner preserved; vanished clients holding nothing are dropped. A
    /// missing or gone robot that reappears returns to allocated when it
    /// still has an owner, otherwise to available.
    pub fn update(&mut self, clients: &[ClientInfo]) {
        let roster: HashMap<&str, &ClientInfo> = clients
            .iter()
            .filter(|client| client.online)
            .map(|client| (client.uri.as_str(), client))
            .collect();

        let known: Vec<String> = self.resources.keys().cloned().collect();
        for uri in known {
            if roster.contains_key(uri.as_str()) {
                continue;
            }
            let Some(resource) = self.resources.get_mut(&uri) else {
                continue;
            };
            match resource.status {
                ResourceStatus::Allocated => {
                    resource.update_status(ResourceStatus::Missing);
                    self.changed = true;
                }
                ResourceStatus::Missing => {}
                ResourceStatus::Available | ResourceStatus::Gone => {
                    self.resources.remove(&uri);
                    self.changed = true;
                }
            }
        }

        for client in roster.values() {
            match self.resources.get_mut(&client.uri) {
                None => {
                    self.resources.insert(
                        client.uri.clone(),
                        Resource::new(client.uri.as_str(), client.capability.as_str()),
                    );
                    self.changed = true;
                }
                Some(resource) => {
                    if resource.capability != client.capability {
                        resource.capability = client.capability.clone();
                        self.changed = true;
                    }
                    match resource.status {
                        ResourceStatus::Missing | ResourceStatus::Gone => {
                            let restored = if resource.owner.is_some() {
                                ResourceStatus::Allocated
                            } else {
                                ResourceStatus::Available
                            };
                            if resource.update_status(restored) {
                                self.changed = true;
                            }
                        }
                        ResourceStatus::Available | ResourceStatus::Allocated => {}
                    }
                }
            }
        }
    }

    /// Per-item match sets against resources whose status is in `statuses`.
    ///
    /// Sets come back in item order and iterate lexicographically. An empty
    /// vector is the failure sentinel: some item (or a zero-item request)
    /// cannot be satisfied. A malformed pattern is an error, not a failed
    /// match.
    pub fn match_list(
        &self,
        specs: &[ResourceSpec],
        statuses: &[ResourceStatus],
    ) -> SchedulerResult<Vec<BTreeSet<String>>> {
        let mut matches = Vec::with_capacity(specs.len());
        for spec in specs {
            let subset = self.match_subset(spec, statuses)?;
            if subset.is_empty() {
                return Ok(Vec::new());
            }
            matches.push(subset);
        }
        Ok(matches)
    }

    fn match_subset(
        &self,
        spec: &ResourceSpec,
        statuses: &[ResourceStatus],
    ) -> SchedulerResult<BTreeSet<String>> {
        let pattern = compile_pattern(&spec.uri)?;
        Ok(self
            .resources
            .values()
            .filter(|res| statuses.contains(&res.status))
            .filter(|res| spec.capability.is_empty() || spec.capability == res.capability)
            .filter(|res| pattern.is_match(&res.uri))
            .map(|res| res.uri.clone())
            .collect())
    }

    /// Try to allocate every item of a request.
    ///
    /// On success the chosen resources transition to allocated under the
    /// request's uuid and come back resolved, in item order. An empty vector
    /// means the request cannot be satisfied right now; the pool is left
    /// untouched. Requests of more than [`MAX_PERMUTATION_ITEMS`] items are
    /// only tried greedily in item order, so a larger request may report
    /// failure even though some non-identity assignment exists.
    pub fn allocate(&mut self, request: &dyn RequestHandle) -> SchedulerResult<Vec<ResourceSpec>> {
        let wanted = request.resources();
        let n = wanted.len();

        let matches = self.match_list(&wanted, &[ResourceStatus::Available])?;
        if matches.is_empty() {
            return Ok(Vec::new());
        }

        // Necessary condition: at least n distinct robots across all items.
        let union: HashSet<&str> = matches
            .iter()
            .flat_map(|set| set.iter().map(String::as_str))
            .collect();
        if union.len() < n {
            return Ok(Vec::new());
        }

        let identity: Vec<usize> = (0..n).collect();
        if let Some(chosen) = assign_in_order(&identity, &matches) {
            return self.commit(request.uuid(), &wanted, &chosen);
        }
        if n > MAX_PERMUTATION_ITEMS {
            return Ok(Vec::new());
        }
        for order in non_identity_permutations(n) {
            if let Some(chosen) = assign_in_order(&order, &matches) {
                return self.commit(request.uuid(), &wanted, &chosen);
            }
        }
        Ok(Vec::new())
    }

    fn commit(
        &mut self,
        owner: RequestId,
        wanted: &[ResourceSpec],
        chosen: &[String],
    ) -> SchedulerResult<Vec<ResourceSpec>> {
        let mut granted = Vec::with_capacity(wanted.len());
        for (spec, uri) in wanted.iter().zip(chosen) {
            let resource = self
                .resources
                .get_mut(uri)
                .ok_or_else(|| SchedulerError::invalid_request(format!("unknown resource {uri}")))?;
            resource.allocate(owner)?;
            let capability = if spec.capability.is_empty() {
                resource.capability.clone()
            } else {
                spec.capability.clone()
            };
            granted.push(ResourceSpec::new(uri.clone(), capability));
        }
        self.changed = true;
        Ok(granted)
    }

    /// Release every resource recorded in the request's allocation
    pub fn release_request(&mut self, request: &dyn RequestHandle) {
        let owner = request.uuid();
        for spec in request.allocations() {
            if let Some(resource) = self.resources.get_mut(&spec.uri) {
                if resource.release(Some(owner)) {
                    self.changed = true;
                }
            }
        }
    }

    /// Release freshly allocated resources that could not be granted
    pub fn release_resources(&mut self, resources: &[ResourceSpec]) {
        for spec in resources {
            if let Some(resource) = self.resources.get_mut(&spec.uri) {
                if resource.release(None) {
                    self.changed = true;
                }
            }
        }
    }
}

/// Walk the items in `order`, picking for each the first matching robot not
/// already taken. Returns the chosen URI per item index, or `None` when some
/// item finds everything taken.
fn assign_in_order(order: &[usize], matches: &[BTreeSet<String>]) -> Option<Vec<String>> {
    let mut chosen: Vec<Option<String>> = vec![None; matches.len()];
    let mut taken: HashSet<&str> = HashSet::new();
    for &index in order {
        let uri = matches[index]
            .iter()
            .find(|uri| !taken.contains(uri.as_str()))?;
        taken.insert(uri.as_str());
        chosen[index] = Some(uri.clone());
    }
    chosen.into_iter().collect()
}

/// Every non-identity permutation of `0..n`, in lexicographic enumeration
/// order, for the small n the allocator retries
fn non_identity_permutations(n: usize) -> Vec<Vec<usize>> {
    match n {
        2 => vec![vec![1, 0]],
        3 => vec![
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
            vec![2, 1, 0],
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ActiveRequest;

    const TELEOP: &str = "concert/teleop";
    const MAPPING: &str = "concert/mapping";
    const MARVIN: &str = "concerto:/turtlebot/marvin";
    const ROBERTO: &str = "concerto:/turtlebot/roberto";

    fn pool_of(entries: &[(&str, &str)]) -> ResourcePool {
        let mut pool = ResourcePool::new();
        let roster: Vec<ClientInfo> = entries
            .iter()
            .map(|(uri, capability)| ClientInfo::online(*uri, *capability))
            .collect();
        pool.update(&roster);
        pool.clear_changed();
        pool
    }

    fn request_of(items: &[(&str, &str)]) -> ActiveRequest {
        ActiveRequest::new(
            RequestId::generate(),
            0,
            items
                .iter()
                .map(|(uri, capability)| ResourceSpec::new(*uri, *capability))
                .collect(),
        )
    }

    fn statuses(pool: &ResourcePool, uri: &str) -> (ResourceStatus, Option<RequestId>) {
        let res = pool.get(uri).expect("resource should exist");
        (res.status(), res.owner())
    }

    #[test]
    fn test_match_exact_uri_and_capability() {
        let res = Resource::new(ROBERTO, TELEOP);
        assert!(res.matches(&ResourceSpec::new(ROBERTO, TELEOP)).unwrap());
        assert!(!res.matches(&ResourceSpec::new(MARVIN, TELEOP)).unwrap());
        assert!(!res.matches(&ResourceSpec::new(ROBERTO, MAPPING)).unwrap());
    }

    #[test]
    fn test_match_empty_capability_matches_any() {
        let res = Resource::new(ROBERTO, TELEOP);
        assert!(res.matches(&ResourceSpec::any_capability(ROBERTO)).unwrap());
    }

    #[test]
    fn test_match_is_anchored() {
        let res = Resource::new(ROBERTO, TELEOP);
        assert!(!res
            .matches(&ResourceSpec::new("concerto:/turtlebot", TELEOP))
            .unwrap());
        assert!(!res
            .matches(&ResourceSpec::new("turtlebot/roberto", TELEOP))
            .unwrap());
        assert!(res
            .matches(&ResourceSpec::new("concerto:/turtlebot/.*", TELEOP))
            .unwrap());
    }

    #[test]
    fn test_match_malformed_pattern_is_invalid_request() {
        let res = Resource::new(ROBERTO, TELEOP);
        let err = res
            .matches(&ResourceSpec::new("concerto:/turtlebot/[", TELEOP))
            .unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_resource_allocate_and_release() {
        let mut res = Resource::new(ROBERTO, TELEOP);
        let owner = RequestId::generate();
        res.allocate(owner).unwrap();
        assert_eq!(res.status(), ResourceStatus::Allocated);
        assert_eq!(res.owner(), Some(owner));

        // double allocation is rejected
        assert!(res.allocate(RequestId::generate()).is_err());

        // mismatched owner is a no-op
        assert!(!res.release(Some(RequestId::generate())));
        assert_eq!(res.status(), ResourceStatus::Allocated);

        assert!(res.release(Some(owner)));
        assert_eq!(res.status(), ResourceStatus::Available);
        assert_eq!(res.owner(), None);
    }

    #[test]
    fn test_release_missing_resource_marks_gone() {
        let mut res = Resource::new(ROBERTO, TELEOP);
        let owner = RequestId::generate();
        res.allocate(owner).unwrap();
        res.update_status(ResourceStatus::Missing);
        assert_eq!(res.owner(), Some(owner));

        assert!(res.release(Some(owner)));
        assert_eq!(res.status(), ResourceStatus::Gone);
        assert_eq!(res.owner(), None);
    }

    #[test]
    fn test_update_status_gone_drops_owner() {
        let mut res = Resource::new(ROBERTO, TELEOP);
        res.allocate(RequestId::generate()).unwrap();
        assert!(res.update_status(ResourceStatus::Gone));
        assert_eq!(res.owner(), None);
        assert!(!res.update_status(ResourceStatus::Gone));
    }

    #[test]
    fn test_update_adds_new_clients_available() {
        let mut pool = ResourcePool::new();
        assert!(pool.is_empty());
        pool.update(&[
            ClientInfo::online(MARVIN, TELEOP),
            ClientInfo::online(ROBERTO, TELEOP),
        ]);
        assert!(pool.changed());
        assert_eq!(pool.len(), 2);
        assert_eq!(statuses(&pool, MARVIN).0, ResourceStatus::Available);
    }

    #[test]
    fn test_update_is_quiet_without_changes() {
        let mut pool = pool_of(&[(MARVIN, TELEOP)]);
        pool.update(&[ClientInfo::online(MARVIN, TELEOP)]);
        assert!(!pool.changed());
    }

    #[test]
    fn test_update_removes_vanished_unallocated() {
        let mut pool = pool_of(&[(MARVIN, TELEOP), (ROBERTO, TELEOP)]);
        pool.update(&[ClientInfo::online(ROBERTO, TELEOP)]);
        assert!(pool.changed());
        assert_eq!(pool.len(), 1);
        assert!(pool.get(MARVIN).is_none());
    }

    #[test]
    fn test_update_offline_counts_as_absent() {
        let mut pool = pool_of(&[(MARVIN, TELEOP)]);
        pool.update(&[ClientInfo::offline(MARVIN, TELEOP)]);
        assert!(pool.get(MARVIN).is_none());
    }

    #[test]
    fn test_update_vanished_allocated_becomes_missing() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted.len(), 1);

        pool.update(&[]);
        let (status, owner) = statuses(&pool, ROBERTO);
        assert_eq!(status, ResourceStatus::Missing);
        assert_eq!(owner, Some(request.uuid()));
    }

    #[test]
    fn test_update_reappearing_missing_restores_allocation() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        pool.allocate(&request).unwrap();
        pool.update(&[]);

        pool.update(&[ClientInfo::online(ROBERTO, TELEOP)]);
        let (status, owner) = statuses(&pool, ROBERTO);
        assert_eq!(status, ResourceStatus::Allocated);
        assert_eq!(owner, Some(request.uuid()));
    }

    #[test]
    fn test_update_refreshes_advertised_capability() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        pool.update(&[ClientInfo::online(ROBERTO, MAPPING)]);
        assert!(pool.changed());
        assert_eq!(pool.get(ROBERTO).unwrap().capability(), MAPPING);
    }

    #[test]
    fn test_known_resources_sorted_by_uri() {
        let pool = pool_of(&[(ROBERTO, TELEOP), (MARVIN, TELEOP)]);
        let snapshot = pool.known_resources();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.resources[0].uri, MARVIN);
        assert_eq!(snapshot.resources[1].uri, ROBERTO);
    }

    #[test]
    fn test_match_list_in_item_order() {
        let pool = pool_of(&[(MARVIN, TELEOP), (ROBERTO, MAPPING)]);
        let matches = pool
            .match_list(
                &[
                    ResourceSpec::new(".*", MAPPING),
                    ResourceSpec::new(".*", TELEOP),
                ],
                &[ResourceStatus::Available],
            )
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].contains(ROBERTO));
        assert!(matches[1].contains(MARVIN));
    }

    #[test]
    fn test_match_list_empty_sentinel() {
        let pool = pool_of(&[(MARVIN, TELEOP)]);
        let matches = pool
            .match_list(
                &[
                    ResourceSpec::new(".*", TELEOP),
                    ResourceSpec::new(".*", MAPPING),
                ],
                &[ResourceStatus::Available],
            )
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_list_zero_items_is_sentinel() {
        let pool = pool_of(&[(MARVIN, TELEOP)]);
        let matches = pool.match_list(&[], &[ResourceStatus::Available]).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_list_respects_status_filter() {
        let mut pool = pool_of(&[(MARVIN, TELEOP)]);
        let request = request_of(&[(MARVIN, TELEOP)]);
        pool.allocate(&request).unwrap();

        let available = pool
            .match_list(
                &[ResourceSpec::new(".*", TELEOP)],
                &[ResourceStatus::Available],
            )
            .unwrap();
        assert!(available.is_empty());

        let either = pool
            .match_list(
                &[ResourceSpec::new(".*", TELEOP)],
                &[ResourceStatus::Available, ResourceStatus::Allocated],
            )
            .unwrap();
        assert_eq!(either.len(), 1);
    }

    #[test]
    fn test_allocate_exact_match() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted, vec![ResourceSpec::new(ROBERTO, TELEOP)]);

        let (status, owner) = statuses(&pool, ROBERTO);
        assert_eq!(status, ResourceStatus::Allocated);
        assert_eq!(owner, Some(request.uuid()));
        assert!(pool.changed());
    }

    #[test]
    fn test_allocate_pattern_picks_lexicographic_first() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP), (MARVIN, TELEOP)]);
        let request = request_of(&[("concerto:/turtlebot/.*", TELEOP)]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted[0].uri, MARVIN);
    }

    #[test]
    fn test_allocate_resolves_empty_capability() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, "")]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted[0].capability, TELEOP);
    }

    #[test]
    fn test_allocate_needs_permutation() {
        // the wildcard would greedily grab alpha, starving the exact item
        let mut pool = pool_of(&[
            ("concerto:/turtlebot/alpha", TELEOP),
            ("concerto:/turtlebot/beta", TELEOP),
        ]);
        let request = request_of(&[
            ("concerto:/turtlebot/.*", TELEOP),
            ("concerto:/turtlebot/alpha", TELEOP),
        ]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted.len(), 2);
        assert_eq!(granted[0].uri, "concerto:/turtlebot/beta");
        assert_eq!(granted[1].uri, "concerto:/turtlebot/alpha");
    }

    #[test]
    fn test_allocate_permutation_three_items() {
        let mut pool = pool_of(&[
            ("concerto:/uav/alpha", TELEOP),
            ("concerto:/uav/beta", TELEOP),
            ("concerto:/uav/gamma", TELEOP),
        ]);
        let request = request_of(&[
            ("concerto:/uav/.*", TELEOP),
            ("concerto:/uav/(alpha|beta)", TELEOP),
            ("concerto:/uav/alpha", TELEOP),
        ]);
        let granted = pool.allocate(&request).unwrap();
        assert_eq!(granted.len(), 3);
        assert_eq!(granted[2].uri, "concerto:/uav/alpha");
        assert_eq!(granted[1].uri, "concerto:/uav/beta");
        assert_eq!(granted[0].uri, "concerto:/uav/gamma");
    }

    #[test]
    fn test_allocate_hall_condition_failure() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP), (ROBERTO, TELEOP)]);
        assert!(pool.allocate(&request).unwrap().is_empty());
        assert_eq!(statuses(&pool, ROBERTO).0, ResourceStatus::Available);
    }

    #[test]
    fn test_allocate_no_permutation_beyond_cutoff() {
        // solvable only by assigning the exact items first, but with four
        // items the allocator will not search permutations
        let mut pool = pool_of(&[
            ("concerto:/uav/a", TELEOP),
            ("concerto:/uav/b", TELEOP),
            ("concerto:/uav/c", TELEOP),
            ("concerto:/uav/d", TELEOP),
        ]);
        let request = request_of(&[
            ("concerto:/uav/.*", TELEOP),
            ("concerto:/uav/a", TELEOP),
            ("concerto:/uav/b", TELEOP),
            ("concerto:/uav/c", TELEOP),
        ]);
        assert!(pool.allocate(&request).unwrap().is_empty());
        for uri in ["concerto:/uav/a", "concerto:/uav/b", "concerto:/uav/c"] {
            assert_eq!(statuses(&pool, uri).0, ResourceStatus::Available);
        }
    }

    #[test]
    fn test_allocate_zero_items_fails() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[]);
        assert!(pool.allocate(&request).unwrap().is_empty());
    }

    #[test]
    fn test_allocate_malformed_pattern_is_error() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[("concerto:/turtlebot/[", TELEOP)]);
        let err = pool.allocate(&request).unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn test_failed_allocation_leaves_pool_unchanged() {
        let mut pool = pool_of(&[(MARVIN, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        assert!(pool.allocate(&request).unwrap().is_empty());
        assert!(!pool.changed());
        assert_eq!(statuses(&pool, MARVIN).0, ResourceStatus::Available);
    }

    #[test]
    fn test_release_request_returns_resources() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        let granted = pool.allocate(&request).unwrap();
        request.wait(concerto_core::Reason::Busy).unwrap();
        request.grant(granted).unwrap();

        pool.release_request(&request);
        assert_eq!(statuses(&pool, ROBERTO).0, ResourceStatus::Available);
    }

    #[test]
    fn test_release_resources_without_owner_check() {
        let mut pool = pool_of(&[(ROBERTO, TELEOP)]);
        let request = request_of(&[(ROBERTO, TELEOP)]);
        let granted = pool.allocate(&request).unwrap();

        pool.release_resources(&granted);
        assert_eq!(statuses(&pool, ROBERTO).0, ResourceStatus::Available);
    }
}
