//! Host-owned collection of managers, keyed by backend name.

use std::any::Any;

use async_trait::async_trait;
use tracing::info;

use crate::backend::Backend;
use crate::error::{AttachError, RegistryError};
use crate::manager::{IntegrationManager, ManagerState};

/// Type-erased view of a manager, as the host drives it.
#[async_trait]
pub trait Lifecycle: Send + 'static {
    fn name(&self) -> &'static str;

    fn state(&self) -> ManagerState;

    fn last_failure(&self) -> Option<&AttachError>;

    async fn attach(&mut self);

    async fn detach(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[async_trait]
impl<B: Backend> Lifecycle for IntegrationManager<B> {
    fn name(&self) -> &'static str {
        IntegrationManager::name(self)
    }

    fn state(&self) -> ManagerState {
        IntegrationManager::state(self)
    }

    fn last_failure(&self) -> Option<&AttachError> {
        IntegrationManager::last_failure(self)
    }

    async fn attach(&mut self) {
        IntegrationManager::attach(self).await
    }

    async fn detach(&mut self) {
        IntegrationManager::detach(self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Managers in registration order. Attach runs front to back, detach back to
/// front.
#[derive(Default)]
pub struct ManagerRegistry {
    managers: Vec<Box<dyn Lifecycle>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<L: Lifecycle>(&mut self, manager: L) -> Result<(), RegistryError> {
        let name = manager.name();
        if self.contains(name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.managers.push(Box::new(manager));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.managers.iter().any(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.managers.iter().map(|m| m.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Lifecycle> {
        self.managers
            .iter()
            .find(|m| m.name() == name)
            .map(|m| m.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Lifecycle + 'static)> {
        self.managers
            .iter_mut()
            .find(|m| m.name() == name)
            .map(|m| m.as_mut())
    }

    /// First registered manager driving backend type `B`.
    pub fn manager<B: Backend>(&self) -> Option<&IntegrationManager<B>> {
        self.managers
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<IntegrationManager<B>>())
    }

    pub fn manager_mut<B: Backend>(&mut self) -> Option<&mut IntegrationManager<B>> {
        self.managers
            .iter_mut()
            .find_map(|m| m.as_any_mut().downcast_mut::<IntegrationManager<B>>())
    }

    pub fn statuses(&self) -> Vec<(&'static str, ManagerState)> {
        self.managers.iter().map(|m| (m.name(), m.state())).collect()
    }

    pub async fn attach_all(&mut self) {
        for manager in self.managers.iter_mut() {
            manager.attach().await;
        }
        let attached = self
            .managers
            .iter()
            .filter(|m| m.state() == ManagerState::Attached)
            .count();
        info!(attached, total = self.managers.len(), "integration attach pass done");
    }

    pub async fn detach_all(&mut self) {
        for manager in self.managers.iter_mut().rev() {
            manager.detach().await;
        }
    }

    /// Final detach before the registry is dropped.
    pub async fn shutdown(mut self) {
        self.detach_all().await;
    }
}
