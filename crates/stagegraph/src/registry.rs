//! Graph models derived from pipeline process metadata.
//!
//! Each pipeline process describes itself with a [`UiMetadata`]: its display
//! name, the data products it consumes and produces, and the plate it
//! belongs to. [`ProcessRegistry::to_graph_model`] turns the registered
//! processes into a [`GraphModel`]:
//!
//! - one descriptive node per process and per distinct product,
//! - an edge `product -> process` for every input and
//!   `process -> product` for every output,
//! - one plate per distinct parent plate, holding its processes.

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::{
    graph::{ConfigError, GraphModel, GraphNode, Plate},
    overlay::OverlayKind,
};

/// Display metadata of one pipeline process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UiMetadata {
    pub display_name: String,
    pub input_products: Vec<String>,
    pub output_products: Vec<String>,
    pub parent_plate: String,
}

impl UiMetadata {
    pub fn new<I, O>(
        display_name: impl Into<String>,
        input_products: I,
        output_products: O,
        parent_plate: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            display_name: display_name.into(),
            input_products: input_products.into_iter().map(Into::into).collect(),
            output_products: output_products.into_iter().map(Into::into).collect(),
            parent_plate: parent_plate.into(),
        }
    }
}

/// A pipeline stage that can be shown in the process graph.
pub trait PipelineProcess {
    fn ui_metadata(&self) -> UiMetadata;
}

/// Converts a display name into a node id: `"Two-View Estimator"` becomes
/// `twoViewEstimator`.
pub fn node_id(display_name: &str) -> String {
    let mut id = String::with_capacity(display_name.len());
    let words = display_name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty());
    for (index, word) in words.enumerate() {
        if index == 0 {
            id.push_str(&word.to_lowercase());
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                id.extend(first.to_uppercase());
                id.push_str(chars.as_str());
            }
        }
    }
    id
}

/// Ordered collection of registered processes.
#[derive(Debug, Default, Clone)]
pub struct ProcessRegistry {
    processes: IndexMap<String, UiMetadata>,
    plate_overlays: IndexMap<String, OverlayKind>,
    product_overlays: IndexMap<String, OverlayKind>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProcess`] if a process with the same
    /// display name was already registered.
    pub fn register(&mut self, process: &impl PipelineProcess) -> Result<(), ConfigError> {
        self.register_metadata(process.ui_metadata())
    }

    /// Registers a process by its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProcess`] on a repeated display name.
    pub fn register_metadata(&mut self, metadata: UiMetadata) -> Result<(), ConfigError> {
        if self.processes.contains_key(&metadata.display_name) {
            return Err(ConfigError::DuplicateProcess(metadata.display_name));
        }
        debug!(process = metadata.display_name; "Process registered");
        self.processes
            .insert(metadata.display_name.clone(), metadata);
        Ok(())
    }

    /// Makes clicks on the plate titled `plate` request `overlay`.
    pub fn bind_plate(&mut self, plate: impl Into<String>, overlay: OverlayKind) {
        self.plate_overlays.insert(plate.into(), overlay);
    }

    /// Turns the node of `product` into a trigger for `overlay`.
    pub fn bind_product(&mut self, product: impl Into<String>, overlay: OverlayKind) {
        self.product_overlays.insert(product.into(), overlay);
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn get(&self, display_name: &str) -> Option<&UiMetadata> {
        self.processes.get(display_name)
    }

    /// Builds the process graph. Every node uses the layout pass.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if two names map to the same node id, or a
    /// binding names a plate that no process belongs to.
    pub fn to_graph_model(&self) -> Result<GraphModel, ConfigError> {
        let mut builder = GraphModel::builder();
        let mut products: IndexSet<&str> = IndexSet::new();
        let mut plates: IndexMap<&str, Vec<String>> = IndexMap::new();

        for metadata in self.processes.values() {
            builder = builder.node(GraphNode::descriptive(
                &node_id(&metadata.display_name),
                metadata.display_name.as_str(),
            ));
            products.extend(metadata.input_products.iter().map(String::as_str));
            products.extend(metadata.output_products.iter().map(String::as_str));
            plates
                .entry(metadata.parent_plate.as_str())
                .or_default()
                .push(node_id(&metadata.display_name));
        }

        for product in &products {
            let id = node_id(product);
            let node = match self.product_overlays.get(*product) {
                Some(overlay) => GraphNode::trigger(&id, *product, *overlay),
                None => GraphNode::descriptive(&id, *product),
            };
            builder = builder.node(node);
        }

        for metadata in self.processes.values() {
            let process = node_id(&metadata.display_name);
            for input in &metadata.input_products {
                builder = builder.edge(&node_id(input), &process);
            }
            for output in &metadata.output_products {
                builder = builder.edge(&process, &node_id(output));
            }
        }

        if let Some(title) = self
            .plate_overlays
            .keys()
            .find(|title| !plates.contains_key(title.as_str()))
        {
            return Err(ConfigError::UnknownPlate(title.clone()));
        }

        for (title, members) in plates {
            let mut plate = Plate::new(title).with_members(members.iter().map(String::as_str));
            if let Some(overlay) = self.plate_overlays.get(title) {
                plate = plate.with_overlay(*overlay);
            }
            builder = builder.plate(plate);
        }

        builder.build()
    }
}
