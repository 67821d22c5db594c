use crate::{DataNode, TraceableValue, Value};

/// Strips data-node and traceable wrappers from a validation block's result.
pub trait ExtractOriginal {
    type Output;

    fn extract_original(self) -> Self::Output;
}

impl ExtractOriginal for DataNode {
    type Output = Value;

    fn extract_original(self) -> Value {
        self.extract()
    }
}

impl ExtractOriginal for &DataNode {
    type Output = Value;

    fn extract_original(self) -> Value {
        self.extract()
    }
}

impl ExtractOriginal for TraceableValue {
    type Output = Value;

    fn extract_original(self) -> Value {
        self.into_value()
    }
}

impl<T: ExtractOriginal> ExtractOriginal for Vec<T> {
    type Output = Vec<T::Output>;

    fn extract_original(self) -> Self::Output {
        self.into_iter().map(ExtractOriginal::extract_original).collect()
    }
}

impl<T: ExtractOriginal> ExtractOriginal for Option<T> {
    type Output = Option<T::Output>;

    fn extract_original(self) -> Self::Output {
        self.map(ExtractOriginal::extract_original)
    }
}

impl<A: ExtractOriginal, B: ExtractOriginal> ExtractOriginal for (A, B) {
    type Output = (A::Output, B::Output);

    fn extract_original(self) -> Self::Output {
        (self.0.extract_original(), self.1.extract_original())
    }
}

macro_rules! extract_as_is {
    ($($ty:ty),*) => {
        $(
            impl ExtractOriginal for $ty {
                type Output = $ty;

                fn extract_original(self) -> $ty {
                    self
                }
            }
        )*
    };
}

extract_as_is!(
    (),
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    serde_json::Value
);
