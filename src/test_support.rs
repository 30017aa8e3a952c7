use crate::domain::listing::{
    ContainerDetail, ContainerSummary, ImageDetail, ImageSummary, NetworkDetail, NetworkSummary,
    VolumeDetail, VolumeSummary,
};
use crate::domain::{ContainerRuntime, Labels, RemoveError, ResourceType};
use crate::infra::removal;
use anyhow::{Result, bail};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;

/// Scripted outcome of `remove` for one resource ID.
#[derive(Debug, Clone)]
enum RemovalPlan {
    /// Fail with these messages on successive calls, then succeed
    FailTimes(VecDeque<String>),
    /// Fail with this message on every call
    Always(String),
}

/// In-memory runtime that records every call it receives.
#[derive(Debug, Default)]
pub struct MockRuntime {
    containers: RwLock<Vec<ContainerSummary>>,
    images: RwLock<Vec<ImageSummary>>,
    volumes: RwLock<Vec<VolumeSummary>>,
    networks: RwLock<Vec<NetworkSummary>>,
    container_details: RwLock<HashMap<String, ContainerDetail>>,
    image_details: RwLock<HashMap<String, ImageDetail>>,
    volume_details: RwLock<HashMap<String, VolumeDetail>>,
    network_details: RwLock<HashMap<String, NetworkDetail>>,
    images_in_use: RwLock<HashSet<String>>,
    volumes_in_use: RwLock<HashSet<String>>,
    networks_in_use: RwLock<HashSet<String>>,
    removals: RwLock<HashMap<String, RemovalPlan>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<HashSet<String>>,
    fail_once: RwLock<HashSet<String>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_container(&self, container: ContainerSummary) {
        self.containers.write().unwrap().push(container);
    }

    pub fn add_image(&self, image: ImageSummary) {
        self.images.write().unwrap().push(image);
    }

    pub fn add_volume(&self, volume: VolumeSummary) {
        self.volumes.write().unwrap().push(volume);
    }

    pub fn add_network(&self, network: NetworkSummary) {
        self.networks.write().unwrap().push(network);
    }

    pub fn set_container_detail(&self, detail: ContainerDetail) {
        self.container_details
            .write()
            .unwrap()
            .insert(detail.id.clone(), detail);
    }

    pub fn set_image_detail(&self, id: &str, detail: ImageDetail) {
        self.image_details
            .write()
            .unwrap()
            .insert(id.to_string(), detail);
    }

    pub fn set_volume_detail(&self, detail: VolumeDetail) {
        self.volume_details
            .write()
            .unwrap()
            .insert(detail.name.clone(), detail);
    }

    pub fn set_network_detail(&self, detail: NetworkDetail) {
        self.network_details
            .write()
            .unwrap()
            .insert(detail.id.clone(), detail);
    }

    pub fn mark_image_in_use(&self, reference: &str) {
        self.images_in_use
            .write()
            .unwrap()
            .insert(reference.to_string());
    }

    pub fn mark_volume_in_use(&self, name: &str) {
        self.volumes_in_use.write().unwrap().insert(name.to_string());
    }

    pub fn mark_network_in_use(&self, name: &str) {
        self.networks_in_use
            .write()
            .unwrap()
            .insert(name.to_string());
    }

    /// Makes `remove(id)` fail with each message once, in order, then succeed.
    pub fn fail_removal_times(&self, id: &str, messages: &[&str]) {
        self.removals.write().unwrap().insert(
            id.to_string(),
            RemovalPlan::FailTimes(messages.iter().map(|m| m.to_string()).collect()),
        );
    }

    /// Makes every `remove(id)` fail with `message`.
    pub fn fail_removal_always(&self, id: &str, message: &str) {
        self.removals
            .write()
            .unwrap()
            .insert(id.to_string(), RemovalPlan::Always(message.to_string()));
    }

    /// Makes the named trait operation (e.g. `list_images`, `volumes_in_use`) fail.
    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on.write().unwrap().insert(operation.to_string());
    }

    /// Makes only the next call of the named operation fail.
    pub fn set_fail_once(&self, operation: &str) {
        self.fail_once.write().unwrap().insert(operation.to_string());
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    /// Removal calls in issue order, as `kind:id`.
    pub fn removal_calls(&self) -> Vec<String> {
        self.get_commands()
            .into_iter()
            .filter_map(|c| c.strip_prefix("remove:").map(str::to_string))
            .collect()
    }

    fn record_command(&self, cmd: &str) {
        self.commands.write().unwrap().push(cmd.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if self.fail_on.read().unwrap().contains(operation) {
            bail!("Mock failure on: {}", operation);
        }
        if self.fail_once.write().unwrap().remove(operation) {
            bail!("Mock failure on: {}", operation);
        }
        Ok(())
    }

    fn lookup<T: Clone>(map: &RwLock<HashMap<String, T>>, keys: &[String]) -> HashMap<String, T> {
        let map = map.read().unwrap();
        keys.iter()
            .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
            .collect()
    }
}

impl ContainerRuntime for MockRuntime {
    fn name(&self) -> &str {
        "mock"
    }

    fn check_available(&self) -> Result<()> {
        self.record_command("check_available");
        self.check_fail("check_available")
    }

    fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        self.record_command("list:containers");
        self.check_fail("list_containers")?;
        Ok(self.containers.read().unwrap().clone())
    }

    fn list_images(&self) -> Result<Vec<ImageSummary>> {
        self.record_command("list:images");
        self.check_fail("list_images")?;
        Ok(self.images.read().unwrap().clone())
    }

    fn list_volumes(&self) -> Result<Vec<VolumeSummary>> {
        self.record_command("list:volumes");
        self.check_fail("list_volumes")?;
        Ok(self.volumes.read().unwrap().clone())
    }

    fn list_networks(&self) -> Result<Vec<NetworkSummary>> {
        self.record_command("list:networks");
        self.check_fail("list_networks")?;
        Ok(self.networks.read().unwrap().clone())
    }

    fn inspect_containers(&self, ids: &[String]) -> Result<HashMap<String, ContainerDetail>> {
        self.record_command(&format!("inspect:containers:{}", ids.len()));
        self.check_fail("inspect_containers")?;
        Ok(Self::lookup(&self.container_details, ids))
    }

    fn inspect_images(&self, ids: &[String]) -> Result<HashMap<String, ImageDetail>> {
        self.record_command(&format!("inspect:images:{}", ids.len()));
        self.check_fail("inspect_images")?;
        Ok(Self::lookup(&self.image_details, ids))
    }

    fn inspect_volumes(&self, names: &[String]) -> Result<HashMap<String, VolumeDetail>> {
        self.record_command(&format!("inspect:volumes:{}", names.len()));
        self.check_fail("inspect_volumes")?;
        Ok(Self::lookup(&self.volume_details, names))
    }

    fn inspect_networks(&self, ids: &[String]) -> Result<HashMap<String, NetworkDetail>> {
        self.record_command(&format!("inspect:networks:{}", ids.len()));
        self.check_fail("inspect_networks")?;
        Ok(Self::lookup(&self.network_details, ids))
    }

    fn images_in_use(&self) -> Result<HashSet<String>> {
        self.record_command("in_use:images");
        self.check_fail("images_in_use")?;
        Ok(self.images_in_use.read().unwrap().clone())
    }

    fn volumes_in_use(&self) -> Result<HashSet<String>> {
        self.record_command("in_use:volumes");
        self.check_fail("volumes_in_use")?;
        Ok(self.volumes_in_use.read().unwrap().clone())
    }

    fn networks_in_use(&self) -> Result<HashSet<String>> {
        self.record_command("in_use:networks");
        self.check_fail("networks_in_use")?;
        Ok(self.networks_in_use.read().unwrap().clone())
    }

    fn remove(&self, kind: ResourceType, id: &str) -> Result<(), RemoveError> {
        self.record_command(&format!("remove:{kind}:{id}"));

        let mut removals = self.removals.write().unwrap();
        let message = match removals.get_mut(id) {
            Some(RemovalPlan::Always(message)) => Some(message.clone()),
            Some(RemovalPlan::FailTimes(messages)) => messages.pop_front(),
            None => None,
        };

        match message {
            Some(message) => Err(removal::classify(kind, &message)),
            None => Ok(()),
        }
    }
}

pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn container(id: &str, name: &str, state: &str) -> ContainerSummary {
    ContainerSummary {
        id: id.to_string(),
        names: name.to_string(),
        image: "alpine:latest".to_string(),
        state: state.to_string(),
        labels: Some(Labels::new()),
        ..Default::default()
    }
}

pub fn image(id: &str, repository: &str, tag: &str, size: u64) -> ImageSummary {
    ImageSummary {
        id: id.to_string(),
        repository: repository.to_string(),
        tag: tag.to_string(),
        size: Some(size),
        labels: Some(Labels::new()),
        ..Default::default()
    }
}

pub fn volume(name: &str) -> VolumeSummary {
    VolumeSummary {
        name: name.to_string(),
        driver: "local".to_string(),
        ..Default::default()
    }
}

pub fn network(id: &str, name: &str) -> NetworkSummary {
    NetworkSummary {
        id: id.to_string(),
        name: name.to_string(),
        driver: "bridge".to_string(),
        ..Default::default()
    }
}
