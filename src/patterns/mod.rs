//! Classic object-oriented design patterns, one module per pattern.

pub mod adapter;
pub mod bridge;
pub mod builder;
pub mod chain_of_responsibility;
pub mod command;
pub mod composite;
pub mod decorator;
pub mod document_editor;
pub mod facade;
pub mod factory;
pub mod flyweight;
pub mod iterator;
pub mod mediator;
pub mod memento;
pub mod observer;
pub mod prototype;
pub mod proxy;
pub mod singleton;
pub mod state;
pub mod strategy;
pub mod template_method;
pub mod visitor;
