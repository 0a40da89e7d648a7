//! End-to-end tests for the batched packed triangular matrix-vector product

mod common;

use batchblas::addressing::packed_size;
use batchblas::blas::{Diagonal, Fill, Operation, tpmv_batched, tpmv_strided_batched};
use batchblas::dtype::{Complex64, Complex128, Element};
use batchblas::error::Error;
use batchblas::handle::Handle;
use batchblas::memory::{DeviceBatch, HostBatch};
use batchblas::runtime::cpu::CpuRuntime;
use batchblas::runtime::{Allocator, LaunchConfig, RuntimeClient};
use batchblas::verify::{near_check_batch, reference, sum_error_tolerance};
use common::{RandomElement, bytes_of, create_cpu_handle, fill_random, seeded_rng};

struct TpmvCase<T: Element> {
    a: HostBatch<T>,
    x: HostBatch<T>,
    expected: HostBatch<T>,
}

#[allow(clippy::too_many_arguments)]
fn tpmv_case<T: RandomElement>(
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    incx: i64,
    batch_count: usize,
    seed: u64,
) -> TpmvCase<T> {
    let mut rng = seeded_rng(seed);
    let mut a = HostBatch::<T>::packed(m, packed_size(m as i64) as isize, batch_count, 1);
    let stride_x = (m * incx.unsigned_abs() as usize) as isize;
    let mut x = HostBatch::<T>::vector(m, incx, stride_x, batch_count, 1);
    fill_random(&mut a, &mut rng);
    fill_random(&mut x, &mut rng);

    let mut expected = x.clone();
    let upper = uplo == Fill::Upper;
    for b in 0..batch_count {
        let ab = a.batch(0, b).to_vec();
        reference::tpmv(upper, trans, diag, m, &ab, expected.batch_mut(0, b), incx);
    }
    TpmvCase { a, x, expected }
}

fn run_strided<T: Element>(
    handle: &Handle<CpuRuntime>,
    uplo: Fill,
    trans: Operation,
    diag: Diagonal,
    m: usize,
    incx: i64,
    da: &DeviceBatch<T, CpuRuntime>,
    dx: &DeviceBatch<T, CpuRuntime>,
) -> batchblas::error::Result<()> {
    tpmv_strided_batched::<T, CpuRuntime>(
        handle,
        uplo,
        trans,
        diag,
        m as i64,
        da.strided(0).raw(),
        da.layout().stride() as i64,
        dx.strided(0).raw(),
        incx,
        dx.layout().stride() as i64,
        da.layout().batch_count() as i64,
    )
}

#[test]
fn test_transpose_negative_increment_matches_reference() {
    let (handle, device) = create_cpu_handle();
    let (m, incx) = (50usize, -1i64);
    let case = tpmv_case::<f64>(Fill::Upper, Operation::Transpose, Diagonal::NonUnit, m, incx, 3, 10);

    let da = DeviceBatch::<f64, CpuRuntime>::from_host(&case.a, &device).unwrap();
    let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&case.x, &device).unwrap();
    run_strided(&handle, Fill::Upper, Operation::Transpose, Diagonal::NonUnit, m, incx, &da, &dx).unwrap();

    let result = dx.to_host().unwrap();
    let tol = m as f64 * sum_error_tolerance::<f64>();
    near_check_batch(&case.expected, &result, tol).unwrap();

    // A is read-only, workspace handed back
    assert_eq!(bytes_of(&da.to_host().unwrap()), bytes_of(&case.a));
    assert_eq!(handle.client().allocator().allocated_bytes(), 0);
}

#[test]
fn test_every_option_combination() {
    let (handle, device) = create_cpu_handle();
    let m = 13usize;
    let mut seed = 100;
    for uplo in [Fill::Upper, Fill::Lower] {
        for trans in [Operation::None, Operation::Transpose, Operation::ConjugateTranspose] {
            for diag in [Diagonal::NonUnit, Diagonal::Unit] {
                for incx in [1i64, 3, -2] {
                    seed += 1;
                    let case = tpmv_case::<Complex128>(uplo, trans, diag, m, incx, 2, seed);
                    let da = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.a, &device).unwrap();
                    let dx = DeviceBatch::<Complex128, CpuRuntime>::from_host(&case.x, &device).unwrap();
                    run_strided(&handle, uplo, trans, diag, m, incx, &da, &dx).unwrap();

                    let tol = m as f64 * sum_error_tolerance::<Complex128>();
                    near_check_batch(&case.expected, &dx.to_host().unwrap(), tol).unwrap_or_else(|e| {
                        panic!("uplo {uplo} trans {trans} diag {diag} incx {incx}: {e}")
                    });
                }
            }
        }
    }
}

#[test]
fn test_unit_diagonal_ignores_stored_diagonal() {
    let (handle, device) = create_cpu_handle();
    let m = 6usize;
    let case = tpmv_case::<f32>(Fill::Lower, Operation::None, Diagonal::Unit, m, 1, 1, 20);

    // overwrite the stored diagonal with NaN; a unit-diagonal product must not read it
    let mut poisoned = case.a.clone();
    for i in 0..m {
        let k = batchblas::addressing::packed_offset(false, m, i, i).unwrap();
        poisoned.batch_mut(0, 0)[k] = f32::NAN;
    }
    let da = DeviceBatch::<f32, CpuRuntime>::from_host(&poisoned, &device).unwrap();
    let dx = DeviceBatch::<f32, CpuRuntime>::from_host(&case.x, &device).unwrap();
    run_strided(&handle, Fill::Lower, Operation::None, Diagonal::Unit, m, 1, &da, &dx).unwrap();

    near_check_batch(
        &case.expected,
        &dx.to_host().unwrap(),
        m as f64 * sum_error_tolerance::<f32>(),
    )
    .unwrap();
}

#[test]
fn test_pointer_array_form() {
    let (handle, device) = create_cpu_handle();
    let m = 21usize;
    let case = tpmv_case::<Complex64>(
        Fill::Lower,
        Operation::ConjugateTranspose,
        Diagonal::NonUnit,
        m,
        2,
        4,
        30,
    );
    let da = DeviceBatch::<Complex64, CpuRuntime>::from_host(&case.a, &device).unwrap();
    let dx = DeviceBatch::<Complex64, CpuRuntime>::from_host(&case.x, &device).unwrap();

    tpmv_batched::<Complex64, CpuRuntime>(
        &handle,
        Fill::Lower,
        Operation::ConjugateTranspose,
        Diagonal::NonUnit,
        m as i64,
        da.ptr_on_device().unwrap(),
        dx.ptr_on_device().unwrap(),
        2,
        4,
    )
    .unwrap();

    near_check_batch(
        &case.expected,
        &dx.to_host().unwrap(),
        m as f64 * sum_error_tolerance::<Complex64>(),
    )
    .unwrap();
}

#[test]
fn test_memory_query_reports_workspace_and_does_no_work() {
    let (handle, device) = create_cpu_handle();
    let (m, batch_count) = (50usize, 3usize);
    let case = tpmv_case::<f64>(Fill::Upper, Operation::None, Diagonal::NonUnit, m, 1, batch_count, 40);
    let da = DeviceBatch::<f64, CpuRuntime>::from_host(&case.a, &device).unwrap();
    let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&case.x, &device).unwrap();

    handle.start_device_memory_size_query().unwrap();
    assert!(handle.is_device_memory_size_query());
    run_strided(&handle, Fill::Upper, Operation::None, Diagonal::NonUnit, m, 1, &da, &dx).unwrap();
    let size = handle.stop_device_memory_size_query().unwrap();

    assert_eq!(size, m * batch_count * std::mem::size_of::<f64>());
    assert_eq!(handle.client().launch_count(), 0);
    assert_eq!(bytes_of(&dx.to_host().unwrap()), bytes_of(&case.x));

    // a second stop without a start is rejected
    assert!(handle.stop_device_memory_size_query().is_err());
}

#[test]
fn test_large_batch_count_is_split_into_launches() {
    let (handle, device) = create_cpu_handle();
    let batch_count = LaunchConfig::MAX_GRID_Y + 7;
    let case = tpmv_case::<f32>(Fill::Upper, Operation::None, Diagonal::NonUnit, 1, 1, batch_count, 50);
    let da = DeviceBatch::<f32, CpuRuntime>::from_host(&case.a, &device).unwrap();
    let dx = DeviceBatch::<f32, CpuRuntime>::from_host(&case.x, &device).unwrap();

    run_strided(&handle, Fill::Upper, Operation::None, Diagonal::NonUnit, 1, 1, &da, &dx).unwrap();

    // two product launches and two copy-back launches
    assert_eq!(handle.client().launch_count(), 4);
    near_check_batch(&case.expected, &dx.to_host().unwrap(), sum_error_tolerance::<f32>()).unwrap();
}

#[test]
fn test_argument_errors() {
    let (handle, device) = create_cpu_handle();
    let case = tpmv_case::<f64>(Fill::Upper, Operation::None, Diagonal::NonUnit, 4, 1, 1, 60);
    let da = DeviceBatch::<f64, CpuRuntime>::from_host(&case.a, &device).unwrap();
    let dx = DeviceBatch::<f64, CpuRuntime>::from_host(&case.x, &device).unwrap();
    let (a, x) = (da.strided(0).raw(), dx.strided(0).raw());

    let call = |uplo: Fill, m: i64, a: u64, x: u64, incx: i64, batch_count: i64| {
        tpmv_strided_batched::<f64, CpuRuntime>(
            &handle,
            uplo,
            Operation::None,
            Diagonal::NonUnit,
            m,
            a,
            10,
            x,
            incx,
            4,
            batch_count,
        )
    };

    assert!(matches!(call(Fill::Full, 4, a, x, 1, 1), Err(Error::InvalidValue { .. })));
    assert!(matches!(call(Fill::Upper, -4, a, x, 1, 1), Err(Error::InvalidSize { arg: "m", .. })));
    assert!(matches!(call(Fill::Upper, 4, a, x, 0, 1), Err(Error::InvalidSize { arg: "incx", .. })));
    assert!(matches!(
        call(Fill::Upper, 4, a, x, 1, -3),
        Err(Error::InvalidSize { arg: "batch_count", .. })
    ));
    assert!(matches!(call(Fill::Upper, 4, 0, x, 1, 1), Err(Error::InvalidPointer { arg: "A" })));
    assert!(matches!(call(Fill::Upper, 4, a, 0, 1, 1), Err(Error::InvalidPointer { arg: "x" })));
    // empty problems never look at pointers
    call(Fill::Upper, 0, 0, 0, 1, 1).unwrap();
    call(Fill::Upper, 4, 0, 0, 1, 0).unwrap();

    assert_eq!(handle.client().launch_count(), 0);
    assert_eq!(handle.client().allocator().allocated_bytes(), 0);
}
