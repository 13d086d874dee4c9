//! Array contexts: where connection index arrays live.
//!
//! Connections keep their element index arrays in whatever representation
//! the array context uses, e.g. plain vectors on the host or integer tensors
//! on a Burn device.

use super::ConnectionError;

/// Moves index arrays between the host and a compute device.
pub trait ArrayContext {
    /// Device-side representation of an index array.
    type IndexArray;

    /// Upload host indices.
    fn to_device(&self, host: &[usize]) -> Result<Self::IndexArray, ConnectionError>;

    /// Download indices to the host.
    fn to_host(&self, array: &Self::IndexArray) -> Result<Vec<usize>, ConnectionError>;
}

/// Keeps everything in host memory.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostArrayContext;

impl ArrayContext for HostArrayContext {
    type IndexArray = Vec<usize>;

    fn to_device(&self, host: &[usize]) -> Result<Vec<usize>, ConnectionError> {
        Ok(host.to_vec())
    }

    fn to_host(&self, array: &Vec<usize>) -> Result<Vec<usize>, ConnectionError> {
        Ok(array.clone())
    }
}

#[cfg(feature = "burn")]
pub use self::burn_context::BurnArrayContext;

#[cfg(feature = "burn")]
mod burn_context {
    use burn::prelude::*;

    use super::{ArrayContext, ConnectionError};

    /// Stores index arrays as 1D integer tensors on a Burn device.
    #[derive(Clone, Debug)]
    pub struct BurnArrayContext<B: Backend> {
        device: B::Device,
    }

    impl<B: Backend> BurnArrayContext<B> {
        pub fn new(device: B::Device) -> Self {
            Self { device }
        }

        pub fn device(&self) -> &B::Device {
            &self.device
        }
    }

    #[cfg(feature = "burn-ndarray")]
    impl Default for BurnArrayContext<burn_ndarray::NdArray> {
        fn default() -> Self {
            Self::new(burn_ndarray::NdArrayDevice::Cpu)
        }
    }

    impl<B: Backend> ArrayContext for BurnArrayContext<B>
    where
        B::IntElem: From<i64>,
        i64: From<B::IntElem>,
    {
        type IndexArray = Tensor<B, 1, Int>;

        fn to_device(&self, host: &[usize]) -> Result<Self::IndexArray, ConnectionError> {
            let data = host
                .iter()
                .map(|&i| {
                    i64::try_from(i)
                        .map(B::IntElem::from)
                        .map_err(|_| ConnectionError::DeviceTransfer(format!("index {i} overflows i64")))
                })
                .collect::<Result<Vec<B::IntElem>, _>>()?;
            Ok(Tensor::from_data(
                burn::tensor::TensorData::new(data, vec![host.len()]),
                &self.device,
            ))
        }

        fn to_host(&self, array: &Self::IndexArray) -> Result<Vec<usize>, ConnectionError> {
            let data = array
                .to_data()
                .to_vec::<B::IntElem>()
                .map_err(|e| ConnectionError::DeviceTransfer(format!("{e:?}")))?;
            data.into_iter()
                .map(|x| {
                    let i = i64::from(x);
                    usize::try_from(i)
                        .map_err(|_| ConnectionError::DeviceTransfer(format!("negative index {i}")))
                })
                .collect()
        }
    }
}
