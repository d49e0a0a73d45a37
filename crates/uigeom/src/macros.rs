/// Adds a `new` constructor and a `next` successor to a `u64` id newtype.
#[macro_export]
macro_rules! impl_id_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn next(self) -> Self {
                Self(self.0 + 1)
            }
        }
    };
}
