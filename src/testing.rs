use async_trait::async_trait;
use kube::ResourceExt;
use kube::core::DynamicObject;
use serde_json::json;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::error::{PromptError, StoreError};
use crate::k8s::ResourceClient;
use crate::model::{DEFAULT_NAMESPACE_SELECTOR, ResourceKind};
use crate::prompt::Prompter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        plural: String,
        namespace: Option<String>,
    },
    Get(String),
    Update(String),
    Delete(String),
}

#[derive(Default)]
struct FakeState {
    pipelines: Vec<DynamicObject>,
    namespaces: Vec<DynamicObject>,
    calls: Vec<Call>,
    failing_gets: HashSet<String>,
    failing_deletes: HashSet<String>,
    failing_pipeline_list: bool,
    failing_namespace_list: bool,
}

/// Store with optimistic concurrency on `metadata.resourceVersion`.
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

pub fn pipeline_object(namespace: &str, name: &str, version: u64) -> DynamicObject {
    let mut object = DynamicObject::new(name, &ResourceKind::pipeline().api_resource())
        .within(namespace)
        .data(json!({
            "spec": {
                "type": "pipeline",
                "pipeline": {
                    "name": name,
                    "agent": { "type": "any" },
                    "stages": [{ "name": "build", "steps": ["make"] }]
                }
            },
            "status": { "phase": "Ready" }
        }));
    object.metadata.resource_version = Some(version.to_string());
    object.metadata.uid = Some(format!("uid-{name}"));
    object
        .labels_mut()
        .insert("app".to_string(), "ci".to_string());
    object
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(self, namespace: &str, name: &str) -> Self {
        self.lock().pipelines.push(pipeline_object(namespace, name, 1));
        self
    }

    pub fn with_namespace(self, name: &str, labelled: bool) -> Self {
        let mut object = DynamicObject::new(name, &ResourceKind::namespace().api_resource());
        if labelled {
            object
                .labels_mut()
                .insert(DEFAULT_NAMESPACE_SELECTOR.to_string(), name.to_string());
        }
        self.lock().namespaces.push(object);
        self
    }

    pub fn failing_get(self, name: &str) -> Self {
        self.lock().failing_gets.insert(name.to_string());
        self
    }

    pub fn failing_delete(self, name: &str) -> Self {
        self.lock().failing_deletes.insert(name.to_string());
        self
    }

    pub fn failing_pipeline_list(self) -> Self {
        self.lock().failing_pipeline_list = true;
        self
    }

    pub fn failing_namespace_list(self) -> Self {
        self.lock().failing_namespace_list = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn pipeline(&self, namespace: &str, name: &str) -> Option<DynamicObject> {
        let state = self.lock();
        find(&state.pipelines, namespace, name).map(|index| state.pipelines[index].clone())
    }

    pub fn pipeline_names(&self, namespace: &str) -> Vec<String> {
        self.lock()
            .pipelines
            .iter()
            .filter(|item| item.namespace().as_deref() == Some(namespace))
            .map(|item| item.name_any())
            .collect()
    }

    /// Simulates another writer changing the stored pipeline.
    pub fn touch(&self, namespace: &str, name: &str, phase: &str) {
        let mut state = self.lock();
        if let Some(index) = find(&state.pipelines, namespace, name) {
            let object = &mut state.pipelines[index];
            object.data["status"]["phase"] = json!(phase);
            object.metadata.resource_version = Some(next_version(object));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake store lock poisoned")
    }
}

fn find(items: &[DynamicObject], namespace: &str, name: &str) -> Option<usize> {
    items.iter().position(|item| {
        item.namespace().as_deref() == Some(namespace) && item.name_any() == name
    })
}

fn next_version(object: &DynamicObject) -> String {
    let current = object
        .resource_version()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(0);
    (current + 1).to_string()
}

fn matches_selector(object: &DynamicObject, selector: Option<&str>) -> bool {
    let Some(selector) = selector else {
        return true;
    };
    let labels = object.labels();
    match selector.split_once('=') {
        Some((key, value)) => labels.get(key).map(String::as_str) == Some(value),
        None => labels.contains_key(selector),
    }
}

#[async_trait]
impl ResourceClient for FakeStore {
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        let mut state = self.lock();
        state.calls.push(Call::List {
            plural: kind.plural.clone(),
            namespace: namespace.map(str::to_string),
        });

        let is_namespace = *kind == ResourceKind::namespace();
        let (failing, items) = if is_namespace {
            (state.failing_namespace_list, &state.namespaces)
        } else {
            (state.failing_pipeline_list, &state.pipelines)
        };
        if failing {
            return Err(StoreError::Rejected("list unavailable".to_string()));
        }

        Ok(items
            .iter()
            .filter(|item| namespace.is_none() || item.namespace().as_deref() == namespace)
            .filter(|item| matches_selector(item, label_selector))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        _kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, StoreError> {
        let mut state = self.lock();
        state.calls.push(Call::Get(name.to_string()));
        if state.failing_gets.contains(name) {
            return Err(StoreError::Rejected(format!("get {name} failed")));
        }
        find(&state.pipelines, namespace, name)
            .map(|index| state.pipelines[index].clone())
            .ok_or_else(|| StoreError::Rejected(format!("pipelines \"{name}\" not found")))
    }

    async fn update(
        &self,
        _kind: &ResourceKind,
        namespace: &str,
        instance: &DynamicObject,
    ) -> Result<DynamicObject, StoreError> {
        let mut state = self.lock();
        let name = instance.name_any();
        state.calls.push(Call::Update(name.clone()));
        let index = find(&state.pipelines, namespace, &name)
            .ok_or_else(|| StoreError::Rejected(format!("pipelines \"{name}\" not found")))?;

        let stored = &mut state.pipelines[index];
        if stored.resource_version() != instance.resource_version() {
            return Err(StoreError::Conflict(format!(
                "operation cannot be fulfilled on pipelines \"{name}\": the object has been modified"
            )));
        }

        let mut updated = instance.clone();
        updated.metadata.resource_version = Some(next_version(stored));
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(
        &self,
        _kind: &ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(Call::Delete(name.to_string()));
        if state.failing_deletes.contains(name) {
            return Err(StoreError::Rejected(format!("delete {name} forbidden")));
        }
        let index = find(&state.pipelines, namespace, name)
            .ok_or_else(|| StoreError::Rejected(format!("pipelines \"{name}\" not found")))?;
        state.pipelines.remove(index);
        Ok(())
    }
}

pub type EditFn = Box<dyn Fn(&str) -> String + Send + Sync>;

pub enum Reply {
    One(String),
    Many(Vec<String>),
    Edit(EditFn),
    Cancel,
}

impl Reply {
    pub fn one(value: &str) -> Self {
        Reply::One(value.to_string())
    }

    pub fn many(values: &[&str]) -> Self {
        Reply::Many(values.iter().map(|value| value.to_string()).collect())
    }

    pub fn unchanged() -> Self {
        Reply::Edit(Box::new(str::to_string))
    }

    pub fn replace(text: &str) -> Self {
        let text = text.to_string();
        Reply::Edit(Box::new(move |_| text.clone()))
    }
}

#[derive(Default)]
pub struct ScriptedPrompter {
    replies: Mutex<VecDeque<Reply>>,
    shown: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedPrompter {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far with the options (or seed text) they offered.
    pub fn shown(&self) -> Vec<(String, Vec<String>)> {
        self.shown.lock().expect("prompt log poisoned").clone()
    }

    fn next(&self, prompt: &str, options: Vec<String>) -> Reply {
        self.shown
            .lock()
            .expect("prompt log poisoned")
            .push((prompt.to_string(), options));
        self.replies
            .lock()
            .expect("reply script poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for prompt {prompt:?}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select_one(&self, prompt: &str, options: &[String]) -> Result<String, PromptError> {
        match self.next(prompt, options.to_vec()) {
            Reply::One(value) => Ok(value),
            Reply::Cancel => Err(PromptError::Cancelled),
            _ => panic!("unexpected reply kind for select_one"),
        }
    }

    fn select_many(&self, prompt: &str, options: &[String]) -> Result<Vec<String>, PromptError> {
        match self.next(prompt, options.to_vec()) {
            Reply::Many(values) => Ok(values),
            Reply::Cancel => Err(PromptError::Cancelled),
            _ => panic!("unexpected reply kind for select_many"),
        }
    }

    fn edit_text(&self, prompt: &str, initial: &str) -> Result<String, PromptError> {
        match self.next(prompt, vec![initial.to_string()]) {
            Reply::Edit(edit) => Ok(edit(initial)),
            Reply::Cancel => Err(PromptError::Cancelled),
            _ => panic!("unexpected reply kind for edit_text"),
        }
    }
}

pub fn yaml_map(text: &str) -> BTreeMap<String, serde_yaml::Value> {
    serde_yaml::from_str(text).expect("valid yaml")
}
