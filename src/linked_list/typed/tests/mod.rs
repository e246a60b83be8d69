mod concurrent;
