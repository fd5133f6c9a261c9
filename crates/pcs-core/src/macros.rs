/// Implements the identity and storage methods of `Packet` for a type that
/// keeps its state in a `base: PacketBase` field and implements `PacketType`.
macro_rules! packet_identity {
    () => {
        fn kind(&self) -> $crate::engine::PacketKind {
            <Self as $crate::engine::PacketType>::KIND
        }

        fn base(&self) -> &$crate::engine::PacketBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut $crate::engine::PacketBase {
            &mut self.base
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

/// Typed getter/setter pairs over layout indices.
///
/// Getters cast to a type at least as wide as the field. Setters keep the
/// layout's range check, so a 4-bit field still rejects `16u8`.
macro_rules! field_accessors {
    ($($(#[$meta:meta])* $get:ident, $set:ident: $ty:ty = $index:expr;)*) => {
        $(
            $(#[$meta])*
            pub fn $get(&self) -> $ty {
                self.base.layout().get($index) as $ty
            }

            #[doc = concat!("Set the value returned by [`Self::", stringify!($get), "`].")]
            pub fn $set(&mut self, value: $ty) -> Result<(), $crate::engine::PacketError> {
                self.base.layout_mut().set($index, u128::from(value))
            }
        )*
    };
}
