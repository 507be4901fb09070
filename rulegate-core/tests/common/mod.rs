// rulegate-core/tests/common/mod.rs
//! Typed test entities: an order with an optional shipping address and a
//! list of line items. Each entity records the hooks it received.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{anyhow, bail};
use once_cell::sync::Lazy;
use rulegate_core::{
    check_fn, CheckRegistry, Control, Entity, EntityShape, ErrorMap, Outcome, RuleDecl, Scope,
};
use serde_json::{json, Value};

pub static REGISTRY: Lazy<CheckRegistry> = Lazy::new(|| {
    let mut registry = CheckRegistry::with_builtins();
    registry.register(
        "within_order_limit",
        check_fn(|input, _| {
            let Some(order) = input.parent() else {
                return Ok(Outcome::Pass);
            };
            let (Some(limit), Some(qty)) = (order.get("max_qty").as_i64(), input.value.as_i64()) else {
                return Ok(Outcome::Pass);
            };
            if qty > limit {
                return Ok(Outcome::error(format!("{} exceeds the order limit of {}", input.label, limit)));
            }
            Ok(Outcome::Pass)
        }),
    );
    registry
});

pub static LINE_ITEM: Lazy<Arc<EntityShape>> = Lazy::new(|| {
    Arc::new(
        EntityShape::builder("line_item")
            .fields(["sku", "qty"])
            .rule("sku", RuleDecl::new("required", Scope::SAVE))
            .rule("qty", RuleDecl::new("min", Scope::SAVE).arg(1).control(Control::EXIT_ON_FAILURE))
            .rule("qty", RuleDecl::new("within_order_limit", Scope::SAVE))
            .build(&REGISTRY)
            .expect("line item shape"),
    )
});

pub static ADDRESS: Lazy<Arc<EntityShape>> = Lazy::new(|| {
    Arc::new(
        EntityShape::builder("address")
            .field("city")
            .rule("city", RuleDecl::new("abort_if", Scope::SAVE).arg("STOP"))
            .rule("city", RuleDecl::new("required", Scope::SAVE))
            .build(&REGISTRY)
            .expect("address shape"),
    )
});

pub static ORDER: Lazy<Arc<EntityShape>> = Lazy::new(|| {
    Arc::new(
        EntityShape::builder("order")
            .fields(["reference", "max_qty"])
            .label("reference", "Order reference")
            .rule(
                "reference",
                RuleDecl::new("required", Scope::SAVE).control(Control::EXIT_ON_FAILURE),
            )
            .rule("reference", RuleDecl::new("max_length", Scope::SAVE).arg(12))
            .one("ship_to", Arc::clone(&ADDRESS))
            .many("items", Arc::clone(&LINE_ITEM))
            .build(&REGISTRY)
            .expect("order shape"),
    )
});

/// Hook calls plus the keys handed to `failed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookLog {
    pub calls: Vec<&'static str>,
    pub failed_keys: Vec<String>,
}

impl HookLog {
    fn failed(&mut self, errors: &ErrorMap) {
        self.calls.push("failed");
        self.failed_keys = errors.keys().map(str::to_string).collect();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItem {
    pub sku: String,
    pub qty: i64,
    pub hooks: HookLog,
}

impl LineItem {
    pub fn new(sku: &str, qty: i64) -> Self {
        Self {
            sku: sku.to_string(),
            qty,
            hooks: HookLog::default(),
        }
    }
}

impl Entity for LineItem {
    fn shape(&self) -> Arc<EntityShape> {
        Arc::clone(&LINE_ITEM)
    }

    fn get(&self, field: &str) -> Value {
        match field {
            "sku" => json!(self.sku),
            "qty" => json!(self.qty),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> anyhow::Result<()> {
        match field {
            "sku" => self.sku = value.as_str().unwrap_or_default().to_string(),
            "qty" => self.qty = value.as_i64().ok_or_else(|| anyhow!("qty must be an integer, got {}", value))?,
            other => bail!("line item has no field '{}'", other),
        }
        Ok(())
    }

    fn before(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("before");
        Ok(())
    }

    fn complete(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("complete");
        Ok(())
    }

    fn failed(&mut self, errors: &ErrorMap, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.failed(errors);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub city: String,
    pub hooks: HookLog,
}

impl Entity for Address {
    fn shape(&self) -> Arc<EntityShape> {
        Arc::clone(&ADDRESS)
    }

    fn get(&self, field: &str) -> Value {
        match field {
            "city" => json!(self.city),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> anyhow::Result<()> {
        match field {
            "city" => self.city = value.as_str().unwrap_or_default().to_string(),
            other => bail!("address has no field '{}'", other),
        }
        Ok(())
    }

    fn before(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("before");
        Ok(())
    }

    fn complete(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("complete");
        Ok(())
    }

    fn failed(&mut self, errors: &ErrorMap, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.failed(errors);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub reference: String,
    pub max_qty: Option<i64>,
    pub ship_to: Option<Address>,
    pub items: Vec<LineItem>,
    pub hooks: HookLog,
}

impl Order {
    pub fn new(reference: &str, items: Vec<LineItem>) -> Self {
        Self {
            reference: reference.to_string(),
            items,
            ..Self::default()
        }
    }
}

impl Entity for Order {
    fn shape(&self) -> Arc<EntityShape> {
        Arc::clone(&ORDER)
    }

    fn get(&self, field: &str) -> Value {
        match field {
            "reference" => json!(self.reference),
            "max_qty" => json!(self.max_qty),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: &str, value: Value) -> anyhow::Result<()> {
        match field {
            "reference" => self.reference = value.as_str().unwrap_or_default().to_string(),
            "max_qty" => self.max_qty = value.as_i64(),
            other => bail!("order has no field '{}'", other),
        }
        Ok(())
    }

    fn child(&self, field: &str) -> Option<&dyn Entity> {
        match field {
            "ship_to" => self.ship_to.as_ref().map(|a| a as &dyn Entity),
            _ => None,
        }
    }

    fn child_mut(&mut self, field: &str) -> Option<&mut dyn Entity> {
        match field {
            "ship_to" => self.ship_to.as_mut().map(|a| a as &mut dyn Entity),
            _ => None,
        }
    }

    fn children(&self, field: &str) -> Vec<&dyn Entity> {
        match field {
            "items" => self.items.iter().map(|i| i as &dyn Entity).collect(),
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self, field: &str) -> Vec<&mut dyn Entity> {
        match field {
            "items" => self.items.iter_mut().map(|i| i as &mut dyn Entity).collect(),
            _ => Vec::new(),
        }
    }

    fn reset_child(&mut self, field: &str) -> Option<&mut dyn Entity> {
        match field {
            "ship_to" => Some(self.ship_to.insert(Address::default()) as &mut dyn Entity),
            _ => None,
        }
    }

    fn push_child(&mut self, field: &str) -> Option<&mut dyn Entity> {
        match field {
            "items" => {
                self.items.push(LineItem::default());
                self.items.last_mut().map(|i| i as &mut dyn Entity)
            }
            _ => None,
        }
    }

    fn clear_children(&mut self, field: &str) {
        if field == "items" {
            self.items.clear();
        }
    }

    fn before(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("before");
        Ok(())
    }

    fn complete(&mut self, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.calls.push("complete");
        Ok(())
    }

    fn failed(&mut self, errors: &ErrorMap, _scope: Scope) -> anyhow::Result<()> {
        self.hooks.failed(errors);
        Ok(())
    }
}
