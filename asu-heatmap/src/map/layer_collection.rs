
use crate::layer::Layer;

/// Key of a layer in a [`LayerCollection`]. Stays valid while other layers are added, removed,
/// hidden or shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Collection of layers with some meta-information.
///
/// When a map is rendered, it draws all visible layers in the order they are stored in the
/// collection. Any layer can be temporary hidden with the [`LayerCollection::hide`] method. Hidden
/// layers are ignored by the renderer and by the input handlers, but retain their place and state
/// in the collection.
///
/// Since a map should be able to render anything implementing the [`Layer`] trait, this
/// collection stores layers as trait objects. Use [`LayerCollection::get_as`] to obtain a concrete
/// layer type.
#[derive(Default)]
pub struct LayerCollection {
    entries: Vec<LayerEntry>,
    next_id: u64,
}

struct LayerEntry {
    id: LayerId,
    layer: Box<dyn Layer>,
    is_hidden: bool,
}

impl LayerCollection {
    /// Appends a layer to the top of the collection.
    pub fn push(&mut self, layer: impl Layer + 'static) -> LayerId {
        self.push_boxed(Box::new(layer))
    }

    /// Appends a boxed layer to the top of the collection.
    pub fn push_boxed(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.entries.push(LayerEntry {
            id,
            layer,
            is_hidden: false,
        });

        id
    }

    /// Removes the layer from the collection and returns it.
    pub fn remove(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index).layer)
    }

    /// Returns true if the collection has the layer.
    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Number of layers in the collection, including hidden ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no layers in the collection.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer by its id.
    pub fn get(&self, id: LayerId) -> Option<&dyn Layer> {
        self.entry(id).map(|entry| &*entry.layer)
    }

    /// Mutable layer by its id.
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut dyn Layer> {
        let index = self.index_of(id)?;
        Some(&mut *self.entries[index].layer)
    }

    /// Layer by its id, downcast to the concrete type.
    pub fn get_as<T: Layer + 'static>(&self, id: LayerId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref()
    }

    /// Mutable layer by its id, downcast to the concrete type.
    pub fn get_as_mut<T: Layer + 'static>(&mut self, id: LayerId) -> Option<&mut T> {
        self.get_mut(id)?.as_any_mut().downcast_mut()
    }

    /// Iterates over all layers from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.entries.iter().map(|entry| &*entry.layer)
    }

    /// Ids of all layers from bottom to top.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Hides the layer. Returns false if there is no such layer.
    pub fn hide(&mut self, id: LayerId) -> bool {
        self.set_hidden(id, true)
    }

    /// Shows a hidden layer. Returns false if there is no such layer.
    pub fn show(&mut self, id: LayerId) -> bool {
        self.set_hidden(id, false)
    }

    /// Returns `Some(true)` if the layer is visible, `None` if there is no such layer.
    pub fn is_visible(&self, id: LayerId) -> Option<bool> {
        self.entry(id).map(|entry| !entry.is_hidden)
    }

    /// Iterates over visible layers from bottom to top.
    pub fn iter_visible(&self) -> impl Iterator<Item = &dyn Layer> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.is_hidden)
            .map(|entry| &*entry.layer)
    }

    /// Iterates over visible layers from top to bottom, which is the order input is dispatched in.
    pub fn iter_visible_mut_rev(&mut self) -> impl Iterator<Item = (LayerId, &mut dyn Layer)> + '_ {
        self.entries
            .iter_mut()
            .rev()
            .filter(|entry| !entry.is_hidden)
            .map(|entry| (entry.id, &mut *entry.layer as &mut dyn Layer))
    }

    fn set_hidden(&mut self, id: LayerId, is_hidden: bool) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.entries[index].is_hidden = is_hidden;
                true
            }
            None => false,
        }
    }

    fn entry(&self, id: LayerId) -> Option<&LayerEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}

impl From<Vec<Box<dyn Layer>>> for LayerCollection {
    fn from(value: Vec<Box<dyn Layer>>) -> Self {
        let mut collection = Self::default();
        for layer in value {
            collection.push_boxed(layer);
        }

        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::tests::TestLayer;

    #[test]
    fn ids_survive_removal() {
        let mut collection = LayerCollection::default();
        let a = collection.push(TestLayer("A"));
        let b = collection.push(TestLayer("B"));
        let c = collection.push(TestLayer("C"));

        let removed = collection.remove(a).unwrap();
        assert_eq!(removed.as_any().downcast_ref(), Some(&TestLayer("A")));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get_as::<TestLayer>(b), Some(&TestLayer("B")));
        assert_eq!(collection.get_as::<TestLayer>(c), Some(&TestLayer("C")));
        assert!(collection.remove(a).is_none());
    }

    #[test]
    fn hidden_layers_keep_their_place() {
        let mut collection = LayerCollection::default();
        let a = collection.push(TestLayer("A"));
        let b = collection.push(TestLayer("B"));
        let c = collection.push(TestLayer("C"));

        assert!(collection.hide(b));
        assert_eq!(collection.is_visible(b), Some(false));
        let visible: Vec<_> = collection
            .iter_visible()
            .filter_map(|l| l.as_any().downcast_ref::<TestLayer>())
            .collect();
        assert_eq!(visible, vec![&TestLayer("A"), &TestLayer("C")]);

        assert!(collection.show(b));
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(collection.is_visible(b), Some(true));
    }

    #[test]
    fn unknown_id() {
        let mut collection = LayerCollection::default();
        let a = collection.push(TestLayer("A"));
        collection.remove(a);

        assert!(!collection.hide(a));
        assert!(!collection.show(a));
        assert_eq!(collection.is_visible(a), None);
        assert!(collection.get(a).is_none());
    }

    #[test]
    fn downcast_to_wrong_type() {
        let mut collection = LayerCollection::default();
        let a = collection.push(TestLayer("A"));
        assert!(collection
            .get_as::<crate::layer::ImageOverlay>(a)
            .is_none());
    }

    #[test]
    fn input_order_is_top_to_bottom() {
        let mut collection = LayerCollection::default();
        let a = collection.push(TestLayer("A"));
        let b = collection.push(TestLayer("B"));
        let c = collection.push(TestLayer("C"));
        collection.hide(b);

        let ids: Vec<_> = collection.iter_visible_mut_rev().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![c, a]);
    }
}
