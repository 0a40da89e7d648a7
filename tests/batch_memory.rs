//! Integration tests for batch containers and host/device transfers

mod common;

use batchblas::addressing::{STRIDE_ALIGNMENT_BYTES, alignment_in_elements};
use batchblas::dtype::{Complex64, Complex128};
use batchblas::error::Error;
use batchblas::memory::{BatchLayout, DeviceBatch, HostBatch};
use batchblas::runtime::cpu::CpuRuntime;
use common::{bytes_of, create_cpu_client, fill_random, seeded_rng};
use rand::Rng;

#[test]
fn test_layout_invariants_random_shapes() {
    let mut rng = seeded_rng(7);
    for _ in 0..200 {
        let rows = rng.random_range(0..20usize);
        let cols = rng.random_range(0..20usize);
        let lda = rows.max(1) + rng.random_range(0..4usize);
        let stride = rng.random_range(-400..400i64) as isize;
        let batch_count = rng.random_range(0..6usize);
        let multiple_count = rng.random_range(0..4usize);

        let layout = BatchLayout::matrix::<Complex64>(rows, cols, lda, stride, batch_count, multiple_count);
        let ms = layout.multiple_stride();
        assert_eq!(ms * multiple_count, layout.total_elements());
        assert_eq!(ms % alignment_in_elements::<Complex64>(), 0);
        assert_eq!((ms * 8) % STRIDE_ALIGNMENT_BYTES, 0);
        let raw = lda * cols + batch_count.saturating_sub(1) * stride.unsigned_abs();
        assert!(ms >= raw);

        // every batch element lies inside its group
        for mi in 0..multiple_count {
            for b in 0..batch_count {
                let range = layout.batch_range(mi, b);
                assert!(range.start >= layout.group_offset(mi));
                assert!(range.end <= layout.group_offset(mi) + ms);
            }
        }
    }
}

#[test]
fn test_host_copy_from_is_bit_exact() {
    let mut rng = seeded_rng(11);
    let mut src = HostBatch::<Complex128>::matrix(5, 4, 7, 40, 3, 2);
    fill_random(&mut src, &mut rng);

    let mut dst = HostBatch::<Complex128>::matrix(5, 4, 7, 40, 3, 2);
    dst.copy_from(&src).unwrap();
    assert_eq!(bytes_of(&dst), bytes_of(&src));
}

#[test]
fn test_host_copy_from_rejects_every_mismatch() {
    let src = HostBatch::<f64>::matrix(4, 4, 4, 16, 2, 2);
    let mismatched = [
        HostBatch::<f64>::matrix(3, 4, 4, 16, 2, 2),
        HostBatch::<f64>::matrix(4, 3, 4, 16, 2, 2),
        HostBatch::<f64>::matrix(4, 4, 5, 16, 2, 2),
        HostBatch::<f64>::matrix(4, 4, 4, 17, 2, 2),
        HostBatch::<f64>::matrix(4, 4, 4, 16, 3, 2),
        HostBatch::<f64>::matrix(4, 4, 4, 16, 2, 1),
    ];
    for mut dst in mismatched {
        dst.fill_with(|| 9.0);
        let before = bytes_of(&dst);
        assert!(matches!(dst.copy_from(&src), Err(Error::LayoutMismatch { .. })));
        assert_eq!(bytes_of(&dst), before);
    }
}

#[test]
fn test_host_device_host_roundtrip() {
    let (_client, device) = create_cpu_client();
    let mut rng = seeded_rng(3);
    let mut host = HostBatch::<f32>::vector(33, -3, -120, 4, 3);
    fill_random(&mut host, &mut rng);

    let dev = DeviceBatch::<f32, CpuRuntime>::from_host(&host, &device).unwrap();
    assert!(!dev.is_managed());
    assert_eq!(dev.ptr() % STRIDE_ALIGNMENT_BYTES as u64, 0);

    let mut back = HostBatch::<f32>::new(*host.layout());
    back.transfer_from(&dev).unwrap();
    assert_eq!(bytes_of(&back), bytes_of(&host));
}

#[test]
fn test_managed_roundtrip_and_device_copy() {
    let (_client, device) = create_cpu_client();
    let mut rng = seeded_rng(5);
    let mut host = HostBatch::<Complex64>::packed(9, 45, 3, 2);
    fill_random(&mut host, &mut rng);

    let mut managed = DeviceBatch::<Complex64, CpuRuntime>::new_managed(*host.layout(), &device);
    managed.memcheck().unwrap();
    assert!(managed.is_managed());
    managed.transfer_from(&host).unwrap();

    let mut plain = DeviceBatch::<Complex64, CpuRuntime>::new(*host.layout(), &device);
    plain.copy_from(&managed).unwrap();

    let mut back = HostBatch::<Complex64>::new(*host.layout());
    back.transfer_from(&plain).unwrap();
    assert_eq!(bytes_of(&back), bytes_of(&host));

    let mut direct = HostBatch::<Complex64>::new(*host.layout());
    direct.transfer_from(&managed).unwrap();
    assert_eq!(bytes_of(&direct), bytes_of(&host));
}

#[test]
fn test_transfer_rejects_layout_mismatch() {
    let (_client, device) = create_cpu_client();
    let host = HostBatch::<f64>::vector(10, 1, 10, 2, 1);
    let mut dev = DeviceBatch::<f64, CpuRuntime>::new(BatchLayout::vector::<f64>(10, 2, 20, 2, 1), &device);
    assert!(matches!(dev.transfer_from(&host), Err(Error::LayoutMismatch { .. })));

    let mut other = HostBatch::<f64>::vector(10, 1, 11, 2, 1);
    assert!(matches!(other.transfer_from(&dev), Err(Error::LayoutMismatch { .. })));
}

#[test]
fn test_unallocatable_device_container_reports_memory_error() {
    let (_client, device) = create_cpu_client();
    let layout = BatchLayout::vector::<f64>(usize::MAX / 16, 1, 0, 1, 1);
    let dev = DeviceBatch::<f64, CpuRuntime>::new(layout, &device);
    assert!(!dev.is_valid());
    assert!(matches!(dev.memcheck(), Err(Error::OutOfMemory { .. })));
    assert_eq!(dev.memcheck().unwrap_err().status() as i32, 5);
    assert!(dev.ptr_on_device().is_err());
}

#[test]
fn test_pointer_array_is_group_major() {
    let (_client, device) = create_cpu_client();
    let dev = DeviceBatch::<f64, CpuRuntime>::new(BatchLayout::matrix::<f64>(3, 3, 3, 9, 4, 3), &device);
    let array = dev.ptr_on_device().unwrap();
    let ptrs = unsafe { std::slice::from_raw_parts(array as *const u64, 12) };
    for mi in 0..3 {
        for b in 0..4 {
            assert_eq!(ptrs[mi * 4 + b], dev.batch_ptr(mi, b));
        }
    }
}
