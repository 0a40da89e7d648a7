//! End-to-end tests for the batched packed Hermitian rank-1 update

mod common;

use batchblas::addressing::packed_size;
use batchblas::blas::{Fill, Scalar, hpr_batched, hpr_strided_batched};
use batchblas::dtype::{Complex64, Complex128, Element};
use batchblas::error::Error;
use batchblas::memory::{DeviceBatch, DeviceBuffer, HostBatch};
use batchblas::runtime::cpu::CpuRuntime;
use batchblas::verify::{near_check_batch, reference, sum_error_tolerance};
use common::{RandomElement, bytes_of, create_cpu_handle, fill_random, seeded_rng};

struct HprCase<T: Element> {
    x: HostBatch<T>,
    ap: HostBatch<T>,
    expected: HostBatch<T>,
}

fn hpr_case<T: RandomElement>(
    upper: bool,
    n: usize,
    incx: i64,
    batch_count: usize,
    alpha: T::Real,
    seed: u64,
) -> HprCase<T> {
    let mut rng = seeded_rng(seed);
    let stride_x = (n * incx.unsigned_abs() as usize) as isize;
    let stride_ap = packed_size(n as i64) as isize;
    let mut x = HostBatch::<T>::vector(n, incx, stride_x, batch_count, 1);
    let mut ap = HostBatch::<T>::packed(n, stride_ap, batch_count, 1);
    fill_random(&mut x, &mut rng);
    fill_random(&mut ap, &mut rng);

    let mut expected = ap.clone();
    for b in 0..batch_count {
        let xb = x.batch(0, b).to_vec();
        reference::hpr(upper, n, alpha, &xb, incx, expected.batch_mut(0, b));
    }
    HprCase { x, ap, expected }
}

fn check_diagonal_is_real<T: Element>(upper: bool, n: usize, ap: &HostBatch<T>) {
    for b in 0..ap.layout().batch_count() {
        let packed = ap.batch(0, b);
        for i in 0..n {
            let k = batchblas::addressing::packed_offset(upper, n, i, i).unwrap();
            assert_eq!(packed[k].imag(), <T::Real as Element>::ZERO, "batch {b} diag {i}");
        }
    }
}

#[test]
fn test_zhpr_strided_upper_matches_reference() {
    let (handle, device) = create_cpu_handle();
    let (n, batch_count, alpha) = (100usize, 2usize, 0.6f64);
    let case = hpr_case::<Complex128>(true, n, 1, batch_count, alpha, 1);

    let dx = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    hpr_strided_batched::<Complex128, CpuRuntime>(
        &handle,
        Fill::Upper,
        n as i64,
        Scalar::Host(alpha),
        dx.strided(0).raw(),
        1,
        dx.layout().stride() as i64,
        dap.strided(0).raw(),
        dap.layout().stride() as i64,
        batch_count as i64,
    )
    .unwrap();
    handle.synchronize().unwrap();

    let result = dap.to_host().unwrap();
    near_check_batch(&case.expected, &result, sum_error_tolerance::<Complex128>()).unwrap();
    check_diagonal_is_real(true, n, &result);
    assert_eq!(handle.client().launch_count(), 1);

    // x is read-only
    let x_after = dx.to_host().unwrap();
    assert_eq!(bytes_of(&x_after), bytes_of(&case.x));
}

#[test]
fn test_zhpr_batched_pointer_arrays_with_device_alpha() {
    let (handle, device) = create_cpu_handle();
    let (n, batch_count, alpha) = (100usize, 2usize, 0.6f64);
    let case = hpr_case::<Complex128>(true, n, 1, batch_count, alpha, 2);

    let dx = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();
    let d_alpha = DeviceBuffer::<CpuRuntime>::from_slice(&[alpha], &device).unwrap();

    hpr_batched::<Complex128, CpuRuntime>(
        &handle,
        Fill::Upper,
        n as i64,
        Scalar::Device(d_alpha.ptr()),
        dx.ptr_on_device().unwrap(),
        1,
        dap.ptr_on_device().unwrap(),
        batch_count as i64,
    )
    .unwrap();

    let result = dap.to_host().unwrap();
    near_check_batch(&case.expected, &result, sum_error_tolerance::<Complex128>()).unwrap();
}

#[test]
fn test_chpr_lower_negative_increment() {
    let (handle, device) = create_cpu_handle();
    let (n, batch_count, alpha) = (37usize, 3usize, -1.25f32);
    let case = hpr_case::<Complex64>(false, n, -2, batch_count, alpha, 3);

    let dx = DeviceBatch::<Complex64, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<Complex64, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    hpr_strided_batched::<Complex64, CpuRuntime>(
        &handle,
        Fill::Lower,
        n as i64,
        Scalar::Host(alpha),
        dx.strided(0).raw(),
        -2,
        dx.layout().stride() as i64,
        dap.strided(0).raw(),
        dap.layout().stride() as i64,
        batch_count as i64,
    )
    .unwrap();

    let result = dap.to_host().unwrap();
    near_check_batch(&case.expected, &result, 4.0 * sum_error_tolerance::<Complex64>()).unwrap();
    check_diagonal_is_real(false, n, &result);
}

#[test]
fn test_real_hpr_is_symmetric_update() {
    let (handle, device) = create_cpu_handle();
    let (n, batch_count, alpha) = (9usize, 4usize, 2.0f64);
    let case = hpr_case::<f64>(true, n, 1, batch_count, alpha, 4);

    let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<f64, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    hpr_strided_batched::<f64, CpuRuntime>(
        &handle,
        Fill::Upper,
        n as i64,
        Scalar::Host(alpha),
        dx.strided(0).raw(),
        1,
        dx.layout().stride() as i64,
        dap.strided(0).raw(),
        dap.layout().stride() as i64,
        batch_count as i64,
    )
    .unwrap();

    let result = dap.to_host().unwrap();
    near_check_batch(&case.expected, &result, sum_error_tolerance::<f64>()).unwrap();
}

#[test]
fn test_zero_order_is_quick_return() {
    let (handle, device) = create_cpu_handle();
    let case = hpr_case::<Complex128>(true, 4, 1, 2, 0.6, 5);
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    // null x is fine when there is nothing to do
    hpr_strided_batched::<Complex128, CpuRuntime>(
        &handle,
        Fill::Upper,
        0,
        Scalar::Host(0.6),
        0,
        1,
        4,
        dap.strided(0).raw(),
        10,
        2,
    )
    .unwrap();

    assert_eq!(handle.client().launch_count(), 0);
    assert_eq!(bytes_of(&dap.to_host().unwrap()), bytes_of(&case.ap));
}

#[test]
fn test_negative_batch_count_is_invalid_size() {
    let (handle, device) = create_cpu_handle();
    let case = hpr_case::<Complex128>(true, 4, 1, 1, 0.6, 6);
    let dx = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    let err = hpr_strided_batched::<Complex128, CpuRuntime>(
        &handle,
        Fill::Upper,
        4,
        Scalar::Host(0.6),
        dx.strided(0).raw(),
        1,
        4,
        dap.strided(0).raw(),
        10,
        -1,
    )
    .unwrap_err();

    assert!(matches!(err, Error::InvalidSize { arg: "batch_count", .. }));
    assert_eq!(handle.client().launch_count(), 0);
    assert_eq!(bytes_of(&dap.to_host().unwrap()), bytes_of(&case.ap));
}

#[test]
fn test_argument_errors() {
    let (handle, device) = create_cpu_handle();
    let case = hpr_case::<Complex128>(true, 4, 1, 1, 0.6, 7);
    let dx = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();
    let (x, ap) = (dx.strided(0).raw(), dap.strided(0).raw());

    let call = |uplo: Fill, n: i64, alpha: Scalar<f64>, x: u64, incx: i64, ap: u64| {
        hpr_strided_batched::<Complex128, CpuRuntime>(&handle, uplo, n, alpha, x, incx, 4, ap, 10, 1)
    };

    assert!(matches!(
        call(Fill::Full, 4, Scalar::Host(0.6), x, 1, ap),
        Err(Error::InvalidValue { .. })
    ));
    assert!(matches!(
        call(Fill::Upper, -1, Scalar::Host(0.6), x, 1, ap),
        Err(Error::InvalidSize { arg: "n", .. })
    ));
    assert!(matches!(
        call(Fill::Upper, 4, Scalar::Host(0.6), x, 0, ap),
        Err(Error::InvalidSize { arg: "incx", .. })
    ));
    assert!(matches!(
        call(Fill::Upper, 4, Scalar::Host(0.6), 0, 1, ap),
        Err(Error::InvalidPointer { arg: "x" })
    ));
    assert!(matches!(
        call(Fill::Upper, 4, Scalar::Host(0.6), x, 1, 0),
        Err(Error::InvalidPointer { arg: "AP" })
    ));
    assert!(matches!(
        call(Fill::Upper, 4, Scalar::Device(0), x, 1, ap),
        Err(Error::InvalidPointer { arg: "alpha" })
    ));
    assert_eq!(handle.client().launch_count(), 0);
}

#[test]
fn test_zero_alpha_leaves_matrix_untouched() {
    let (handle, device) = create_cpu_handle();
    let case = hpr_case::<Complex128>(true, 8, 1, 2, 0.0, 8);
    let dap = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.ap, &device).unwrap();

    // host alpha of zero returns before the remaining pointer checks
    hpr_strided_batched::<Complex128, CpuRuntime>(
        &handle,
        Fill::Upper,
        8,
        Scalar::Host(0.0),
        0,
        1,
        8,
        dap.strided(0).raw(),
        dap.layout().stride() as i64,
        2,
    )
    .unwrap();

    assert_eq!(handle.client().launch_count(), 0);
    assert_eq!(bytes_of(&dap.to_host().unwrap()), bytes_of(&case.ap));
}
