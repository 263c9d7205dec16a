//! Bake-time knowledge about action kinds.
//!
//! The compiler does not know what any particular action means.
//! Each action kind is described by an [`ActionDefinition`]: the parameters an author may
//! set (for tooling) and a mapper that turns those string parameters into the
//! integer/float slots of the baked node.
//! New leaf behaviors are added by registering a definition, without touching the compiler.

use std::collections::HashMap;

use crate::{
    buffer::NodeKind,
    hash::hash32,
    params::{ParamMap, Params},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Float,
    Int,
    Bool,
    String,
    Enum,
    AbilityId,
}

/// Describes one authorable parameter of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    pub label: String,
    pub ty: ParamType,
    pub default: String,
    pub tooltip: String,
}

/// The parts of a node record a mapper is allowed to fill.
/// Links are owned by the compiler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeSlots {
    pub kind: NodeKind,
    pub params_i: [i32; 3],
    pub params_f: [f32; 4],
}

impl BakeSlots {
    /// Slots as they are before a mapper runs: an action node carrying its own hash.
    pub fn for_action(action_hash: i32) -> Self {
        Self {
            kind: NodeKind::Action,
            params_i: [action_hash, 0, 0],
            params_f: [0.; 4],
        }
    }
}

pub type BakeMapper = Box<dyn Fn(Params, &mut BakeSlots) + Send + Sync>;

pub struct ActionDefinition {
    name: String,
    action_hash: i32,
    params: Vec<ParamDescriptor>,
    mapper: Option<BakeMapper>,
}

impl std::fmt::Debug for ActionDefinition {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("action_hash", &self.action_hash)
            .field("params", &self.params)
            .field("mapper", &self.mapper.is_some())
            .finish()
    }
}

impl ActionDefinition {
    pub fn new(name: impl ToString) -> Self {
        let name = name.to_string();
        Self {
            action_hash: hash32(&name),
            name,
            params: vec![],
            mapper: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action_hash(&self) -> i32 {
        self.action_hash
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn param(mut self, name: &str, ty: ParamType, default: &str, tooltip: &str) -> Self {
        self.params.push(ParamDescriptor {
            name: name.to_owned(),
            label: name.to_owned(),
            ty,
            default: default.to_owned(),
            tooltip: tooltip.to_owned(),
        });
        self
    }

    pub fn float(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::Float, default, tooltip)
    }

    pub fn int(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::Int, default, tooltip)
    }

    pub fn bool(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::Bool, default, tooltip)
    }

    pub fn string(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::String, default, tooltip)
    }

    pub fn enumeration(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::Enum, default, tooltip)
    }

    pub fn ability_id(self, name: &str, default: &str, tooltip: &str) -> Self {
        self.param(name, ParamType::AbilityId, default, tooltip)
    }

    /// Sets the display label of the most recently added parameter.
    pub fn labeled(mut self, label: &str) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.label = label.to_owned();
        }
        self
    }

    pub fn bake(mut self, mapper: impl Fn(Params, &mut BakeSlots) + Send + Sync + 'static) -> Self {
        self.mapper = Some(Box::new(mapper));
        self
    }

    /// Produces the slots of a node of this action kind from its authored parameters.
    pub fn map(&self, params: &ParamMap) -> BakeSlots {
        let mut slots = BakeSlots::for_action(self.action_hash);
        if let Some(mapper) = &self.mapper {
            mapper(Params::new(params), &mut slots);
        }
        slots
    }
}

pub struct ActionCatalog {
    definitions: HashMap<String, ActionDefinition>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        let mut ret = Self::empty();
        ret.register_builtins();
        ret
    }
}

impl ActionCatalog {
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    pub fn register(&mut self, definition: ActionDefinition) {
        tracing::debug!(action = definition.name(), "registering action definition");
        if let Some(old) = self
            .definitions
            .insert(definition.name.clone(), definition)
        {
            tracing::warn!(action = old.name(), "action definition replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn parameters(&self, name: &str) -> &[ParamDescriptor] {
        self.get(name)
            .map(ActionDefinition::params)
            .unwrap_or_default()
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn register_builtins(&mut self) {
        self.register(
            ActionDefinition::new("Wait")
                .float("seconds", "0.5", "Wait duration in seconds")
                .labeled("Wait Duration")
                .bake(|p, slots| slots.params_f[0] = p.f32_or("seconds", 0.5)),
        );

        self.register(
            ActionDefinition::new("AnimatorSetState")
                .string("state", "Idle", "Animator state name")
                .labeled("State Name")
                .float("fade", "0.1", "Cross-fade duration in seconds")
                .labeled("Fade Duration")
                .bake(|p, slots| {
                    slots.params_i[1] = hash32(p.str_or("state", "Idle"));
                    slots.params_f[0] = p.f32_or("fade", 0.1);
                }),
        );

        self.register(
            ActionDefinition::new("AnimatorSetFloat")
                .string("param", "Speed", "Animator parameter name")
                .labeled("Parameter")
                .float("value", "1.0", "Parameter value")
                .bake(|p, slots| {
                    slots.params_i[1] = hash32(p.str_or("param", "Speed"));
                    slots.params_f[0] = p.f32_or("value", 1.);
                }),
        );

        self.register(
            ActionDefinition::new("AnimatorSetInt")
                .string("param", "Phase", "Animator parameter name")
                .labeled("Parameter")
                .int("value", "0", "Parameter value")
                .bake(|p, slots| {
                    slots.params_i[1] = hash32(p.str_or("param", "Phase"));
                    slots.params_f[0] = p.f32_or("value", 0.);
                }),
        );

        self.register(
            ActionDefinition::new("AnimatorSetBool")
                .string("param", "IsRunning", "Animator parameter name")
                .labeled("Parameter")
                .bool("value", "true", "Parameter value")
                .bake(|p, slots| {
                    slots.params_i[1] = hash32(p.str_or("param", "IsRunning"));
                    slots.params_f[0] = if p.bool_or("value", true) { 1. } else { 0. };
                }),
        );

        self.register(
            ActionDefinition::new("AnimatorSetTrigger")
                .string("param", "Fire", "Animator trigger name")
                .labeled("Parameter")
                .bake(|p, slots| slots.params_i[1] = hash32(p.str_or("param", "Fire"))),
        );

        self.register(
            ActionDefinition::new("WaitAnimEvent")
                .string("event", "OnRecover", "Animation event to wait for")
                .labeled("Event Name")
                .bake(|p, slots| slots.params_i[1] = hash32(p.str_or("event", "OnRecover"))),
        );

        self.register(
            ActionDefinition::new("SetBlackboard")
                .string("key", "", "Blackboard key")
                .float("value", "0", "Value to write")
                .bake(|p, slots| {
                    slots.kind = NodeKind::SetBlackboard;
                    slots.params_i[0] = hash32(p.str_or("key", ""));
                    slots.params_f[0] = p.f32_or("value", 0.);
                }),
        );

        self.register(
            ActionDefinition::new("ClearBlackboard")
                .string("key", "", "Blackboard key, empty clears everything")
                .bake(|p, slots| {
                    slots.kind = NodeKind::ClearBlackboard;
                    slots.params_i[0] = hash32(p.str_or("key", ""));
                }),
        );
    }
}
