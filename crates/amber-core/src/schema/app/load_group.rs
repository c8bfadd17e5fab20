/// Index allocators of one entity type, threaded through field
/// initialization.
///
/// A root type starts with load group 0 as its default group. A
/// joined-inheritance subtype continues numbering after its parent, so masks
/// sized for the subtype cover every inherited field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeBuilder {
    /// Last allocated load group index
    last_load_group: usize,

    /// Group shared by all eager scalar fields
    default_load_group: usize,

    /// Next free dirty index
    next_dirty: usize,

    /// First dirty index owned by this type
    min_dirty: usize,
}

impl TypeBuilder {
    pub fn root() -> TypeBuilder {
        TypeBuilder {
            last_load_group: 0,
            default_load_group: 0,
            next_dirty: 0,
            min_dirty: 0,
        }
    }

    /// Allocators for a subtype of the type `parent` finished building.
    pub fn subtype(parent: &TypeBuilder) -> TypeBuilder {
        let default_load_group = parent.last_load_group + 1;

        TypeBuilder {
            last_load_group: default_load_group,
            default_load_group,
            next_dirty: parent.next_dirty,
            min_dirty: parent.next_dirty,
        }
    }

    pub fn next_load_group_index(&mut self) -> usize {
        self.last_load_group += 1;
        self.last_load_group
    }

    pub fn default_load_group_index(&self) -> usize {
        self.default_load_group
    }

    pub fn next_dirty_index(&mut self) -> usize {
        let index = self.next_dirty;
        self.next_dirty += 1;
        index
    }

    /// Number of load mask bits an instance of the type needs.
    pub fn load_group_count(&self) -> usize {
        self.last_load_group + 1
    }

    /// Number of dirty mask bits an instance of the type needs.
    pub fn dirty_count(&self) -> usize {
        self.next_dirty
    }

    pub fn min_dirty_index(&self) -> usize {
        self.min_dirty
    }
}

impl Default for TypeBuilder {
    fn default() -> Self {
        TypeBuilder::root()
    }
}
